use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use masthead::search::{SortMode, TypeFilter};
use masthead::types::{ContentKind, ContentStatus};

/// Editorial command line for the magazine content API
#[derive(Parser)]
#[command(name = "masthead")]
#[command(about = "Browse, search and edit magazine content", long_about = None)]
pub struct Cli {
    /// Config file (defaults to config.toml in the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Override the API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Bearer token for admin endpoints
    #[arg(long, global = true)]
    pub token: Option<String>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Kind {
    Article,
    Video,
    #[value(alias = "tv-show", alias = "show")]
    Tvshow,
    Podcast,
}

impl From<Kind> for ContentKind {
    fn from(k: Kind) -> Self {
        match k {
            Kind::Article => ContentKind::Article,
            Kind::Video => ContentKind::Video,
            Kind::Tvshow => ContentKind::TvShow,
            Kind::Podcast => ContentKind::Podcast,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Status {
    Draft,
    Published,
    Scheduled,
    Archived,
}

impl From<Status> for ContentStatus {
    fn from(s: Status) -> Self {
        match s {
            Status::Draft => ContentStatus::Draft,
            Status::Published => ContentStatus::Published,
            Status::Scheduled => ContentStatus::Scheduled,
            Status::Archived => ContentStatus::Archived,
        }
    }
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(value_enum)]
    pub kind: Kind,
    #[arg(long, value_enum)]
    pub status: Option<Status>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: Option<u32>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,
    /// Server-side text filter
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Text to match against titles, descriptions, people and tags
    pub query: String,
    /// all, articles, videos, tvshows or podcasts
    #[arg(long = "type", default_value = "all")]
    pub kind: TypeFilter,
    #[arg(long)]
    pub category: Option<String>,
    /// relevance, date or popularity
    #[arg(long, default_value = "relevance")]
    pub sort: SortMode,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    #[arg(long, default_value_t = 12)]
    pub per_page: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List content of one kind (admin view, every status)
    List(ListArgs),
    /// Show a single item
    Show {
        #[arg(value_enum)]
        kind: Kind,
        id: String,
    },
    /// Delete one or more items
    Delete {
        #[arg(value_enum)]
        kind: Kind,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Validate and save a draft from a JSON or TOML file
    Save {
        #[arg(value_enum)]
        kind: Kind,
        draft: PathBuf,
        /// Update this item instead of creating a new one
        #[arg(long)]
        id: Option<String>,
    },
    /// Relevance search across published content
    Search(SearchArgs),
    /// Featured articles, videos and podcasts
    Featured,
    /// Trending articles and videos
    Trending,
    /// Editor's pick articles
    EditorsPick,
    /// Categories with item counts
    Categories,
    /// Everything in one category
    Category { name: String },
    /// Dashboard figures
    Stats {
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_search_flags() {
        let cli = Cli::try_parse_from(["masthead", "--json", "search", "ai", "--type", "articles", "--sort", "date", "--per-page", "5"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Search(a) => {
                assert_eq!(a.query, "ai");
                assert_eq!(a.kind, TypeFilter::Articles);
                assert_eq!(a.sort, SortMode::Date);
                assert_eq!((a.page, a.per_page), (1, 5));
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn delete_takes_many_ids_and_kind_aliases() {
        let cli = Cli::try_parse_from(["masthead", "delete", "tv-show", "1", "2"]).unwrap();
        match cli.command {
            Commands::Delete { kind, ids } => {
                assert_eq!(ContentKind::from(kind), ContentKind::TvShow);
                assert_eq!(ids, ["1", "2"]);
            }
            _ => panic!("expected delete"),
        }
        assert!(Cli::try_parse_from(["masthead", "delete", "article"]).is_err());
    }

    #[test]
    fn list_paging_rejects_out_of_range_values() {
        let cli = Cli::try_parse_from(["masthead", "list", "video", "--page", "3", "--limit", "20"]).unwrap();
        match cli.command {
            Commands::List(a) => assert_eq!((a.page, a.limit), (Some(3), Some(20))),
            _ => panic!("expected list"),
        }
        assert!(Cli::try_parse_from(["masthead", "list", "video", "--page", "4294967297"]).is_err());
        assert!(Cli::try_parse_from(["masthead", "list", "video", "--limit", "0"]).is_err());
    }
}
