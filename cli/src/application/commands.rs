use std::str::FromStr;

use dietchat_core::domain::{feedback::Reaction, meal::MealType, session::ChatMode};
use thiserror::Error;

pub const HELP: &str = "\
命令:
  <文字>               描述一餐（饮食分析模式）或提问（咨询模式）
  /meal <早餐|午餐|晚餐|零食>  切换餐次
  /mode <meal|chat>    切换饮食分析 / 咨询模式
  /pick <问题> <选项>   回答澄清问题（从 1 开始编号）
  /confirm             提交澄清选择
  /cancel              关闭澄清卡片
  /like [n] /dislike [n]  评价第 n 条 AI 回复（默认最新一条）
  /share [n]           分享第 n 条 AI 回复
  /records             查看饮食记录
  /delete <id>         删除饮食记录
  /help                显示帮助
  /quit                退出";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    Meal(MealType),
    Mode(ChatMode),
    /// Zero-based item and option indices.
    Pick { item: usize, option: usize },
    Confirm,
    Cancel,
    /// `target` is the one-based reply number; `None` means the latest reply.
    React {
        reaction: Reaction,
        target: Option<usize>,
    },
    Share { target: Option<usize> },
    Records,
    Delete(i64),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("未知命令: /{0}，输入 /help 查看帮助")]
    Unknown(String),
    #[error("/{command} 需要参数: {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("无效参数: {0}")]
    InvalidArgument(String),
}

fn positive(raw: &str) -> Result<usize, CommandError> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::InvalidArgument(raw.to_string())),
    }
}

fn one_based(raw: &str) -> Result<usize, CommandError> {
    positive(raw).map(|n| n - 1)
}

fn optional_target(raw: Option<&str>) -> Result<Option<usize>, CommandError> {
    raw.map(positive).transpose()
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Say(line.to_string()));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let first = parts.next();

        match name {
            "meal" => {
                let raw = first.ok_or(CommandError::MissingArgument {
                    command: "meal",
                    expected: "早餐|午餐|晚餐|零食",
                })?;
                raw.parse::<MealType>()
                    .map(Command::Meal)
                    .map_err(|_| CommandError::InvalidArgument(raw.to_string()))
            }
            "mode" => match first {
                Some("meal") | Some("饮食") => Ok(Command::Mode(ChatMode::MealAnalysis)),
                Some("chat") | Some("咨询") => Ok(Command::Mode(ChatMode::FreeChat)),
                Some(other) => Err(CommandError::InvalidArgument(other.to_string())),
                None => Err(CommandError::MissingArgument {
                    command: "mode",
                    expected: "meal|chat",
                }),
            },
            "pick" => {
                let missing = CommandError::MissingArgument {
                    command: "pick",
                    expected: "<问题> <选项>",
                };
                let item = one_based(first.ok_or(missing.clone())?)?;
                let option = one_based(parts.next().ok_or(missing)?)?;
                Ok(Command::Pick { item, option })
            }
            "confirm" => Ok(Command::Confirm),
            "cancel" => Ok(Command::Cancel),
            "like" => Ok(Command::React {
                reaction: Reaction::Like,
                target: optional_target(first)?,
            }),
            "dislike" => Ok(Command::React {
                reaction: Reaction::Dislike,
                target: optional_target(first)?,
            }),
            "share" => Ok(Command::Share {
                target: optional_target(first)?,
            }),
            "records" => Ok(Command::Records),
            "delete" => {
                let raw = first.ok_or(CommandError::MissingArgument {
                    command: "delete",
                    expected: "<id>",
                })?;
                raw.parse::<i64>()
                    .map(Command::Delete)
                    .map_err(|_| CommandError::InvalidArgument(raw.to_string()))
            }
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
