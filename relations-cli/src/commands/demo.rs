//! Relationship demo commands

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use relations_core::{DatabaseConfig, RelationsConfig};
use relations_server::db::{create_pool, migrations, Target};
use relations_server::demo::{self, M2mReport, RelationsReport};

#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Which demo to run
    #[arg(value_enum)]
    pub which: DemoKind,

    /// Use a throwaway in-memory database instead of the configured one
    #[arg(long)]
    pub in_memory: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum DemoKind {
    /// Users, profiles and posts with joined / select-in loading
    Relations,
    /// Orders and products through the association table
    M2m,
}

pub async fn run_demo(args: DemoArgs, config: RelationsConfig) -> Result<()> {
    let database = if args.in_memory {
        DatabaseConfig {
            echo: config.database.echo,
            ..DatabaseConfig::in_memory()
        }
    } else {
        config.database
    };

    let pool = create_pool(&database)
        .await
        .with_context(|| format!("Failed to open database {}", database.url))?;
    migrations::upgrade(&pool, Target::Head)
        .await
        .context("Failed to migrate database")?;

    match args.which {
        DemoKind::Relations => {
            let report = demo::main_relations(&pool)
                .await
                .context("Relations demo failed")?;
            print_relations(&report);
        }
        DemoKind::M2m => {
            let report = demo::demo_m2m(&pool).await.context("M2M demo failed")?;
            print_m2m(&report);
        }
    }

    pool.close().await;
    Ok(())
}

fn print_relations(report: &RelationsReport) {
    println!("users:");
    for user in &report.users {
        println!("  {user}");
    }
    match &report.missing_lookup {
        Some(user) => println!("found user bob {user}"),
        None => println!("found user bob None"),
    }

    println!("\nusers with profiles (joined):");
    for entry in &report.users_with_profiles {
        let first_name = entry.profile.as_ref().and_then(|p| p.first_name.as_deref());
        println!("  {} {}", entry.user, first_name.unwrap_or("-"));
    }

    println!("\nusers with posts (select-in):");
    for entry in &report.users_with_posts {
        println!("{}", "**".repeat(10));
        println!("{}", entry.user);
        for post in &entry.posts {
            println!("- {post}");
        }
    }

    println!("\nposts with authors (joined):");
    for entry in &report.posts_with_authors {
        println!("  post {} author {}", entry.post, entry.author);
    }

    println!("\nusers with profiles (joined) and posts (select-in):");
    for entry in &report.users_with_profiles_and_posts {
        println!("{}", "**".repeat(10));
        let name = entry.profile.as_ref().and_then(|p| p.full_name());
        println!("{} {}", entry.user, name.as_deref().unwrap_or("-"));
        for post in &entry.posts {
            println!("- {post}");
        }
    }

    println!("\nprofiles of 'john' with user and posts:");
    for entry in &report.john_profiles {
        println!(
            "  {} {}",
            entry.profile.first_name.as_deref().unwrap_or("-"),
            entry.user
        );
        for post in &entry.posts {
            println!("  - {post}");
        }
    }
}

fn print_m2m(report: &M2mReport) {
    for entry in [&report.order_one, &report.order_promo] {
        println!("{} total={}", entry.order, entry.total());
        for product in &entry.products {
            println!("  - {product}");
        }
    }
}
