use std::{collections::HashSet, io::Write, path::PathBuf};

use anyhow::Context;
use dietchat_core::{
    application::{ChatController, Submission},
    domain::{
        common::entities::app_errors::CoreError,
        feed::{MessageBody, Role},
        meal::{ports::DietApi, MealRecord},
        render::markup::format_number,
        share::ShareOutcome,
    },
};
use tokio::io::AsyncRead;
use uuid::Uuid;

use super::{
    commands::{Command, HELP},
    document::render_document,
    share::HtmlCardExporter,
    terminal::{ConsoleClipboard, Terminal},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Drives a [`ChatController`] from terminal input and mirrors the feed
/// into an HTML file after every step.
pub struct Repl<A: DietApi, R, W> {
    controller: ChatController<A>,
    terminal: Terminal<R, W>,
    exporter: HtmlCardExporter,
    clipboard: ConsoleClipboard,
    feed_path: PathBuf,
    shown: HashSet<Uuid>,
}

impl<A, R, W> Repl<A, R, W>
where
    A: DietApi,
    R: AsyncRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(
        controller: ChatController<A>,
        terminal: Terminal<R, W>,
        exporter: HtmlCardExporter,
        feed_path: PathBuf,
    ) -> Self {
        Self {
            controller,
            terminal,
            exporter,
            clipboard: ConsoleClipboard,
            feed_path,
            shown: HashSet::new(),
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.controller.check_status().await;
        if let Err(e) = self.controller.refresh_records().await {
            tracing::warn!("Failed to load meal records: {}", e);
        }
        writeln!(self.terminal.out(), "{HELP}")?;
        self.flush().await?;

        loop {
            let session = self.controller.session();
            write!(
                self.terminal.out(),
                "{} {} · {}> ",
                session.meal_type.icon(),
                session.meal_type,
                session.mode.placeholder()
            )?;
            self.terminal.out().flush()?;

            let Some(line) = self.terminal.read_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let flow = match line.parse::<Command>() {
                Ok(command) => self.handle(command).await?,
                Err(e) => {
                    writeln!(self.terminal.out(), "{e}")?;
                    Flow::Continue
                }
            };
            self.flush().await?;
            if flow == Flow::Quit {
                break;
            }
        }

        tracing::info!("Session ended");
        Ok(())
    }

    pub async fn handle(&mut self, command: Command) -> anyhow::Result<Flow> {
        match command {
            Command::Say(text) => {
                self.controller.submit(&text).await;
            }
            Command::Meal(meal_type) => {
                self.controller.set_meal_type(meal_type);
                writeln!(self.terminal.out(), "已切换到 {} {}", meal_type.icon(), meal_type)?;
            }
            Command::Mode(mode) => {
                self.controller.set_mode(mode);
                writeln!(self.terminal.out(), "{}", mode.placeholder())?;
            }
            Command::Pick { item, option } => self.pick(item, option)?,
            Command::Confirm => {
                if self.controller.confirm().await == Submission::Ignored {
                    writeln!(self.terminal.out(), "请先为每个问题选择一个选项")?;
                }
            }
            Command::Cancel => {
                if !self.controller.remove_clarification() {
                    writeln!(self.terminal.out(), "当前没有需要确认的问题")?;
                }
            }
            Command::React { reaction, target } => {
                let Some(message_id) = self.resolve_reply(target) else {
                    writeln!(self.terminal.out(), "没有可评价的回复")?;
                    return Ok(Flow::Continue);
                };
                let result = self
                    .controller
                    .react(message_id, reaction, &self.terminal)
                    .await;
                match result {
                    Ok(true) => writeln!(self.terminal.out(), "感谢您的反馈！")?,
                    Ok(false) => writeln!(self.terminal.out(), "这条回复已经评价过了")?,
                    Err(_) => writeln!(self.terminal.out(), "反馈提交失败，请稍后重试")?,
                }
            }
            Command::Share { target } => {
                let Some(message_id) = self.resolve_reply(target) else {
                    writeln!(self.terminal.out(), "没有可分享的回复")?;
                    return Ok(Flow::Continue);
                };
                let result = self
                    .controller
                    .share(message_id, &self.exporter, &self.clipboard)
                    .await;
                match result {
                    Ok(ShareOutcome::Exported(location)) => {
                        writeln!(self.terminal.out(), "分享卡片已保存: {location}")?
                    }
                    Ok(ShareOutcome::CopiedToClipboard) => {
                        writeln!(self.terminal.out(), "图片生成失败，已复制文字内容")?
                    }
                    Err(e) => writeln!(self.terminal.out(), "分享失败: {e}")?,
                }
            }
            Command::Records => match self.controller.refresh_records().await {
                Ok(records) => self.print_records(&records)?,
                Err(e) => writeln!(self.terminal.out(), "{}", e.user_message())?,
            },
            Command::Delete(record_id) => {
                let result = self
                    .controller
                    .delete_record(record_id, &self.terminal)
                    .await;
                match result {
                    Ok(true) => writeln!(self.terminal.out(), "记录已删除")?,
                    Ok(false) => writeln!(self.terminal.out(), "已取消")?,
                    Err(e) => writeln!(self.terminal.out(), "删除失败: {}", e.user_message())?,
                }
            }
            Command::Help => writeln!(self.terminal.out(), "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn pick(&mut self, item: usize, option: usize) -> anyhow::Result<()> {
        match self.controller.select_option(item, option) {
            Ok(true) => writeln!(self.terminal.out(), "所有问题已回答，输入 /confirm 提交")?,
            Ok(false) => {
                if let Some(card) = self.clarification_text() {
                    writeln!(self.terminal.out(), "{card}")?;
                }
            }
            Err(CoreError::NotFound) => writeln!(self.terminal.out(), "当前没有需要确认的问题")?,
            Err(CoreError::Busy) => writeln!(self.terminal.out(), "正在计算中，请稍候")?,
            Err(e) => writeln!(self.terminal.out(), "{e}")?,
        }
        Ok(())
    }

    fn clarification_text(&self) -> Option<String> {
        let card_id = self.controller.session().pending?.card_id();
        self.controller.plain_text(&card_id)
    }

    /// AI messages that carry reply actions, in feed order.
    fn replies(&self) -> Vec<Uuid> {
        self.controller
            .messages()
            .into_iter()
            .map(|message| message.id)
            .filter(|id| self.controller.binding(id).is_some())
            .collect()
    }

    fn resolve_reply(&self, target: Option<usize>) -> Option<Uuid> {
        let replies = self.replies();
        match target {
            Some(n) => replies.get(n.checked_sub(1)?).copied(),
            None => replies.last().copied(),
        }
    }

    fn print_records(&mut self, records: &[MealRecord]) -> anyhow::Result<()> {
        if records.is_empty() {
            writeln!(self.terminal.out(), "暂无饮食记录")?;
            return Ok(());
        }
        for record in records {
            writeln!(
                self.terminal.out(),
                "#{} {} {} {} {} 卡 {}",
                record.id,
                record.icon(),
                record.meal_type,
                record.short_date().unwrap_or_default(),
                format_number(record.total_calories.unwrap_or_default()),
                record.food_names()
            )?;
        }
        Ok(())
    }

    /// Prints messages that appeared since the last step and rewrites the
    /// feed file.
    pub async fn flush(&mut self) -> anyhow::Result<()> {
        let replies = self.replies();
        for message in self.controller.messages() {
            if message.role == Role::User
                || matches!(message.body, MessageBody::Loading)
                || !self.shown.insert(message.id)
            {
                continue;
            }

            let text = self.controller.plain_text(&message.id).unwrap_or_default();
            match replies.iter().position(|id| *id == message.id) {
                Some(index) => writeln!(self.terminal.out(), "🤖 #{} {text}", index + 1)?,
                None => writeln!(self.terminal.out(), "🤖 {text}")?,
            }
            if matches!(message.body, MessageBody::Clarification) {
                writeln!(self.terminal.out(), "使用 /pick <问题> <选项> 选择，然后输入 /confirm")?;
            }
        }

        let html = render_document(
            &self.controller.session(),
            &self.controller.render_feed(),
            &self.controller.render_records(),
        );
        tokio::fs::write(&self.feed_path, html)
            .await
            .with_context(|| format!("failed to write feed to {}", self.feed_path.display()))?;
        Ok(())
    }
}
