use anyhow::{Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use log::{info, warn};
use mdmigrate::blog::paginate;
use mdmigrate::collection::{check, load_blog};
use mdmigrate::config::Config;
use mdmigrate::feed::write_feed;
use mdmigrate::migrate::Migrator;
use mdmigrate::normalize::Category;
use mdmigrate::status::{ImageReport, StatusReport};
use std::fs::File;
use std::io;
use std::path::Path;

const CATEGORIES: &[&str] = &["docs", "blog", "about"];

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run(&app().get_matches()) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(1);
        }
    }
}

fn app() -> App<'static, 'static> {
    let category = || {
        Arg::with_name("category")
            .required(true)
            .possible_values(CATEGORIES)
            .help("The kind of content in the tree")
    };
    let output = || {
        Arg::with_name("output")
            .long("output")
            .short("o")
            .takes_value(true)
            .value_name("FILE")
    };

    App::new("mdmigrate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Migrates Markdown content to canonical frontmatter and derives the blog feed")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config")
                .long("config")
                .short("c")
                .takes_value(true)
                .value_name("FILE")
                .global(true)
                .help("Project file to use instead of searching for mdmigrate.yaml"),
        )
        .subcommand(
            SubCommand::with_name("migrate")
                .about("Normalizes the frontmatter of every Markdown file in a tree")
                .arg(category())
                .arg(Arg::with_name("source").required(true))
                .arg(Arg::with_name("destination").required(true)),
        )
        .subcommand(
            SubCommand::with_name("audit")
                .about("Lists docs that have no entry in the sidebar order table")
                .arg(Arg::with_name("docs").required(true))
                .arg(
                    Arg::with_name("strict")
                        .long("strict")
                        .help("Exit with an error status when any doc is unlisted"),
                ),
        )
        .subcommand(
            SubCommand::with_name("check")
                .about("Validates a migrated collection against its schema")
                .arg(category())
                .arg(Arg::with_name("collection").required(true)),
        )
        .subcommand(
            SubCommand::with_name("feed")
                .about("Writes the RSS feed for a migrated blog collection")
                .arg(Arg::with_name("blog").required(true))
                .arg(output().help("Write the feed to FILE instead of stdout")),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Prints the paginated blog listing, newest first")
                .arg(Arg::with_name("blog").required(true)),
        )
        .subcommand(
            SubCommand::with_name("verify")
                .about("Checks built page counts and writes the migration status report")
                .arg(Arg::with_name("dist").required(true))
                .arg(
                    output()
                        .default_value("migration-status.json")
                        .help("Where to write the JSON report"),
                ),
        )
        .subcommand(
            SubCommand::with_name("verify-images")
                .about("Checks that every source image made it into the build")
                .arg(Arg::with_name("public").required(true))
                .arg(Arg::with_name("dist").required(true)),
        )
}

fn run(matches: &ArgMatches) -> Result<i32> {
    let (name, sub) = match matches.subcommand() {
        (name, Some(sub)) => (name, sub),
        _ => return Ok(2),
    };
    let config = load_config(sub.value_of("config").or_else(|| matches.value_of("config")))?;

    match name {
        "migrate" => {
            let category: Category = sub.value_of("category").unwrap_or_default().parse()?;
            let summary = Migrator::new(category, &config.sidebar_order)
                .run(path(sub, "source"), path(sub, "destination"))?;
            if summary.without_frontmatter > 0 {
                warn!(
                    "{} files had no frontmatter and were copied unchanged",
                    summary.without_frontmatter
                );
            }
            Ok(0)
        }
        "audit" => {
            let docs = path(sub, "docs");
            let unlisted = config
                .sidebar_order
                .unlisted(docs)
                .with_context(|| format!("Auditing docs under {}", docs.display()))?;
            for doc in &unlisted {
                warn!("{} has no sidebar order", doc.display());
            }
            info!("{} docs without a sidebar order", unlisted.len());
            Ok(match sub.is_present("strict") && !unlisted.is_empty() {
                true => 1,
                false => 0,
            })
        }
        "check" => {
            let category: Category = sub.value_of("category").unwrap_or_default().parse()?;
            let count = check(category, path(sub, "collection"))?;
            info!("{} {} entries match the schema", count, category);
            Ok(0)
        }
        "feed" => {
            let posts = load_blog(path(sub, "blog"))?;
            match sub.value_of("output") {
                Some(output) => {
                    let file = File::create(output)
                        .with_context(|| format!("Creating feed file `{}`", output))?;
                    write_feed(config.feed_config(), &posts, file)?;
                    info!("Wrote {} feed items to {}", posts.len(), output);
                }
                None => write_feed(config.feed_config(), &posts, io::stdout())?,
            }
            Ok(0)
        }
        "list" => {
            let posts = load_blog(path(sub, "blog"))?;
            for page in paginate(&posts, config.blog_page_size) {
                println!("Page {} ({})", page.number + 1, page.url);
                for post in page.posts {
                    println!("  {}  {}  {}", post.identity.date, post.identity.url(), post.title);
                }
            }
            Ok(0)
        }
        "verify" => {
            let dist = path(sub, "dist");
            let report = StatusReport::verify(dist, &config.expected_pages)
                .with_context(|| format!("Counting built pages under {}", dist.display()))?;
            let output = sub.value_of("output").unwrap_or("migration-status.json");
            let file = File::create(output)
                .with_context(|| format!("Creating status report `{}`", output))?;
            serde_json::to_writer_pretty(file, &report)
                .with_context(|| format!("Writing status report `{}`", output))?;
            println!("{}", report);
            Ok(match report.passed() {
                true => {
                    println!("\n✓ Migration verification PASSED!");
                    0
                }
                false => {
                    println!("\n✗ Migration verification FAILED - some pages missing");
                    1
                }
            })
        }
        "verify-images" => {
            let report = ImageReport::verify(path(sub, "public"), path(sub, "dist"))
                .context("Counting images")?;
            println!("{}", report);
            Ok(match report.passed() {
                true => {
                    println!("\n✓ Image verification PASSED!");
                    0
                }
                false => {
                    println!("\n✗ Image verification FAILED - some images missing");
                    1
                }
            })
        }
        _ => Ok(2),
    }
}

fn path<'a>(matches: &'a ArgMatches, key: &str) -> &'a Path {
    Path::new(matches.value_of(key).unwrap_or_default())
}

fn load_config(path: Option<&str>) -> Result<Config> {
    Ok(match path {
        Some(path) => Config::from_project_file(Path::new(path))?,
        None => {
            let dir = std::env::current_dir().context("Finding the working directory")?;
            Config::from_directory(&dir)?
        }
    })
}
