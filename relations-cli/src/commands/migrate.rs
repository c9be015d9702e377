//! Schema migration commands

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relations_core::RelationsConfig;
use relations_server::db::{create_pool, migrations, Target};

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommands,
}

#[derive(Subcommand, Debug)]
pub enum MigrateCommands {
    /// Upgrade to a revision (default: head)
    Up {
        /// Target revision id, or "head"
        #[arg(default_value = "head")]
        revision: Target,
    },
    /// Downgrade to a revision (default: one step back)
    Down {
        /// Target revision id, or "base"
        revision: Option<Target>,
    },
    /// Show the applied revision
    Current,
    /// List all revisions, oldest first
    History,
}

pub async fn run_migrate(args: MigrateArgs, config: &RelationsConfig) -> Result<()> {
    let pool = create_pool(&config.database)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;

    match args.command {
        MigrateCommands::Up { revision } => {
            let applied = migrations::upgrade(&pool, revision)
                .await
                .context("Upgrade failed")?;
            if applied.is_empty() {
                println!("Already up to date");
            }
            for rev in applied {
                println!("Applied {rev}");
            }
        }
        MigrateCommands::Down { revision } => {
            let current = migrations::current(&pool).await?;
            let target = match revision {
                Some(target) => target,
                None => previous(current.as_deref()),
            };
            let reverted = migrations::downgrade(&pool, target)
                .await
                .context("Downgrade failed")?;
            if reverted.is_empty() {
                println!("Nothing to downgrade");
            }
            for rev in reverted {
                println!("Reverted {rev}");
            }
        }
        MigrateCommands::Current => {
            let current = migrations::current(&pool).await?;
            match current {
                Some(rev) if rev == migrations::head() => println!("{rev} (head)"),
                Some(rev) => println!("{rev}"),
                None => println!("base"),
            }
        }
        MigrateCommands::History => {
            let current = migrations::current(&pool).await?;
            print_history(current.as_deref());
        }
    }

    pool.close().await;
    Ok(())
}

/// Target one step below `current`.
fn previous(current: Option<&str>) -> Target {
    let down = migrations::history()
        .iter()
        .find(|m| Some(m.revision) == current)
        .and_then(|m| m.down_revision);
    match down {
        Some(rev) => Target::Revision(rev.to_owned()),
        None => Target::Base,
    }
}

fn print_history(current: Option<&str>) {
    for migration in migrations::history().iter().rev() {
        let marker = if Some(migration.revision) == current {
            " (current)"
        } else {
            ""
        };
        println!(
            "{} -> {}, {}{}",
            migration.down_revision.unwrap_or("<base>"),
            migration.revision,
            migration.description,
            marker
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_steps_back_one() {
        assert_eq!(previous(Some(migrations::head())), Target::Revision("a1f0c2d9e4b7".into()));
        assert_eq!(previous(Some("6b4b3268d773")), Target::Base);
        assert_eq!(previous(None), Target::Base);
    }
}
