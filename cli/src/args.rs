use std::path::PathBuf;

use clap::Parser;
use dietchat_core::domain::{
    common::{ApiConfig, DietChatConfig, SessionConfig},
    meal::MealType,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "dietchat")]
#[command(about = "Describe your meals and chat with the Dietchat nutrition assistant")]
pub struct Args {
    #[command(flatten)]
    pub api: ApiArgs,

    #[command(flatten)]
    pub session: SessionArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ApiArgs {
    #[arg(
        long = "api-base-url",
        env = "DIETCHAT_API_BASE_URL",
        default_value = "http://127.0.0.1:7860"
    )]
    pub base_url: String,
}

#[derive(Debug, Clone, clap::Args)]
pub struct SessionArgs {
    /// Meal category new descriptions are tagged with (早餐, 午餐, 晚餐, 零食 or breakfast, lunch, ...)
    #[arg(long = "meal", env = "DIETCHAT_DEFAULT_MEAL", default_value = "早餐")]
    pub meal: MealType,
}

#[derive(Debug, Clone, clap::Args)]
pub struct OutputArgs {
    /// HTML file the rendered conversation is written to after every step
    #[arg(long = "feed-path", env = "DIETCHAT_FEED_PATH", default_value = "feed.html")]
    pub feed_path: PathBuf,

    /// Directory share cards are exported into
    #[arg(long = "share-dir", env = "DIETCHAT_SHARE_DIR", default_value = ".")]
    pub share_dir: PathBuf,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LogArgs {
    /// Emit logs as JSON lines on stderr
    #[arg(long = "log-json", env = "DIETCHAT_LOG_JSON")]
    pub json: bool,
}

impl From<Args> for DietChatConfig {
    fn from(args: Args) -> Self {
        DietChatConfig {
            api: ApiConfig {
                base_url: args.api.base_url,
            },
            session: SessionConfig {
                default_meal: args.session.meal,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["dietchat"]);
        assert_eq!(args.output.feed_path, PathBuf::from("feed.html"));
        assert!(!args.log.json);

        let config = DietChatConfig::from(args);
        assert_eq!(config.api.base_url, "http://127.0.0.1:7860");
        assert_eq!(config.session.default_meal, MealType::Breakfast);
    }

    #[test]
    fn test_meal_accepts_english_and_chinese() {
        let args = Args::parse_from(["dietchat", "--meal", "dinner", "--log-json"]);
        assert_eq!(args.session.meal, MealType::Dinner);
        assert!(args.log.json);

        let args = Args::parse_from(["dietchat", "--meal", "零食"]);
        assert_eq!(args.session.meal, MealType::Snack);
    }

    #[test]
    fn test_unknown_meal_is_rejected() {
        assert!(Args::try_parse_from(["dietchat", "--meal", "brunch"]).is_err());
    }
}
