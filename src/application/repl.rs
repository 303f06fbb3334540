#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;

use std::collections::HashMap;

use anyhow::Result;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use yansi::Paint;

use crate::domain::models::Action;
use crate::domain::models::AppModel;
use crate::domain::models::Answer;
use crate::domain::models::Artifact;
use crate::domain::models::BuildJob;
use crate::domain::models::BuildStatus;
use crate::domain::models::Event;
use crate::domain::models::ExportInput;
use crate::domain::models::ExportTarget;
use crate::domain::models::OnboardingQuestion;
use crate::domain::models::Progress;
use crate::domain::models::QuestionType;
use crate::domain::models::SlashCommand;
use crate::domain::services::actions::help_text;
use crate::domain::services::exporters;
use crate::domain::services::BuilderSession;
use crate::domain::services::OnboardingFlow;
use crate::domain::services::RejectReason;
use crate::domain::services::Submission;
use crate::infrastructure::artifacts::ArtifactWriter;

pub fn format_progress(progress: &Progress) -> String {
    if progress.message.is_empty() {
        return format!("[{:>3}%]", progress.percent);
    }

    return format!("[{:>3}%] {}", progress.percent, progress.message);
}

/// One line per screen. `>` marks the current screen, `*` a screen changed by
/// the last update.
pub fn format_screens(model: &AppModel) -> String {
    if model.screens.is_empty() {
        return "No screens yet.".to_string();
    }

    return model
        .screens
        .iter()
        .enumerate()
        .map(|(idx, screen)| {
            let current = if idx == model.current_index() { ">" } else { " " };
            let changed = if screen.recently_changed { "*" } else { " " };
            return format!("{current}{changed} {}. {}", idx + 1, screen.name);
        })
        .collect::<Vec<String>>()
        .join("\n");
}

pub fn format_question(question: &OnboardingQuestion, index: usize, total: usize) -> String {
    let hint = match question.qtype {
        QuestionType::Single => "pick one",
        QuestionType::Multi => "pick any, comma separated",
        QuestionType::Text => "free text",
    };

    let mut lines = vec![format!(
        "({}/{total}) {} [{hint}]",
        index + 1,
        question.question.trim()
    )];
    for (idx, option) in question.options.iter().enumerate() {
        lines.push(format!("  {}. {option}", idx + 1));
    }

    return lines.join("\n");
}

pub fn format_build(job: &BuildJob) -> String {
    let mut line = format!("Build {} is {}", job.id, job.status);
    if let Some(message) = &job.message {
        line = format!("{line}: {message}");
    }
    if job.status == BuildStatus::Done {
        if let Some(url) = &job.artifact_url {
            line = format!("{line}\nDownload: {url}");
        }
    }

    return line;
}

struct PendingAnswers {
    index: usize,
    answers: HashMap<String, Answer>,
}

/// Line based front end for one builder session.
pub struct Repl {
    session: BuilderSession,
    action_tx: mpsc::UnboundedSender<Action>,
    pending: Option<PendingAnswers>,
    writer: ArtifactWriter,
    theme_color: String,
}

impl Repl {
    pub fn new(
        session: BuilderSession,
        action_tx: mpsc::UnboundedSender<Action>,
        writer: ArtifactWriter,
        theme_color: &str,
    ) -> Repl {
        return Repl {
            session,
            action_tx,
            pending: None,
            writer,
            theme_color: theme_color.to_string(),
        };
    }

    pub async fn start(mut self, mut event_rx: mpsc::UnboundedReceiver<Event>) -> Result<()> {
        self.print_welcome();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let line = match line? {
                        Some(line) => line,
                        None => break,
                    };
                    if !self.handle_line(&line).await? {
                        break;
                    }
                }
                event = event_rx.recv() => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => break,
                    }
                }
            }
        }

        self.session.teardown(&self.action_tx);
        return Ok(());
    }

    fn print_welcome(&self) {
        let model = &self.session.model;
        println!(
            "{} {} ({})",
            Paint::new("Screenforge").bold(),
            model.display_name(),
            model.id
        );
        if model.is_empty() {
            println!("Describe the app you want to build. Type /help for commands.");
        } else {
            println!("{}", format_screens(model));
            println!("Describe a change to update the screens. Type /help for commands.");
        }
    }

    async fn handle_line(&mut self, line: &str) -> Result<bool> {
        if let Some(cmd) = SlashCommand::parse(line) {
            return self.handle_command(cmd).await;
        }
        if line.trim().is_empty() && self.pending.is_none() {
            return Ok(true);
        }

        if self.pending.is_some() {
            self.answer(line)?;
            return Ok(true);
        }

        let res = self.session.submit(line, &self.action_tx)?;
        self.print_submission(res);
        return Ok(true);
    }

    async fn handle_command(&mut self, cmd: SlashCommand) -> Result<bool> {
        if cmd.is_quit() {
            return Ok(false);
        }

        if cmd.is_help() {
            println!("{}", help_text());
        } else if cmd.is_export() {
            let target = match cmd.args.first() {
                Some(name) => match name.parse::<ExportTarget>() {
                    Ok(target) => target,
                    Err(_) => {
                        println!("{}", Paint::red(format!("Unknown export target '{name}'.")));
                        return Ok(true);
                    }
                },
                None => ExportTarget::Static,
            };
            self.export(target).await;
        } else if cmd.is_build() {
            self.build();
        } else if cmd.is_cancel_build() {
            self.action_tx.send(Action::CancelBuild())?;
            println!("Stopped tracking the cloud build.");
        } else if cmd.is_retry() {
            let res = self.session.retry(&self.action_tx)?;
            self.print_submission(res);
        } else if cmd.is_screens() {
            println!("{}", format_screens(&self.session.model));
            self.session.model.settle_changes();
        } else if cmd.is_show() {
            self.show(cmd.args.first());
        } else if cmd.is_next() {
            self.session.model.navigate(1);
            self.show(None);
        } else if cmd.is_prev() {
            self.session.model.navigate(-1);
            self.show(None);
        } else if cmd.is_skip() {
            self.pending = None;
            let res = self.session.skip_onboarding(&self.action_tx)?;
            self.print_submission(res);
        }

        return Ok(true);
    }

    fn print_submission(&self, res: Submission) {
        match res {
            Submission::Accepted(mode) => {
                tracing::debug!(mode = %mode, "Prompt accepted");
                println!("{}", Paint::cyan("Working on it..."));
            }
            Submission::Rejected(RejectReason::Blank) => {}
            Submission::Rejected(RejectReason::InFlight) => {
                println!("{}", Paint::yellow("Still working on the last request."));
            }
            Submission::Rejected(RejectReason::NothingToRetry) => {
                println!("{}", Paint::yellow("Nothing to retry yet."));
            }
            Submission::Rejected(RejectReason::NoOnboarding) => {
                println!("{}", Paint::yellow("There are no questions to skip."));
            }
        }
    }

    fn show(&self, arg: Option<&String>) {
        let model = &self.session.model;
        let index = match arg.map(|arg| return arg.parse::<usize>()) {
            Some(Ok(num)) if num >= 1 => num - 1,
            Some(_) => {
                println!("{}", Paint::red("Pass a screen number, see /screens."));
                return;
            }
            None => model.current_index(),
        };

        match model.screens.get(index) {
            Some(screen) => {
                println!("{}", Paint::new(format!("{}. {}", index + 1, screen.name)).bold());
                println!("{}", screen.content);
            }
            None => println!("No screen {}.", index + 1),
        }
    }

    fn answer(&mut self, line: &str) -> Result<()> {
        let flow = match &self.session.onboarding {
            Some(flow) => flow,
            None => {
                self.pending = None;
                return Ok(());
            }
        };
        let pending = match &mut self.pending {
            Some(pending) => pending,
            None => return Ok(()),
        };

        if let Some(question) = flow.questions.get(pending.index) {
            let answer = OnboardingFlow::parse_answer(question, line);
            pending.answers.insert(question.id.to_string(), answer);
        }
        pending.index += 1;

        if let Some(question) = flow.questions.get(pending.index) {
            println!("{}", format_question(question, pending.index, flow.questions.len()));
            return Ok(());
        }

        let answers = match self.pending.take() {
            Some(pending) => pending.answers,
            None => HashMap::new(),
        };
        let res = self.session.answer_onboarding(&answers, &self.action_tx)?;
        self.print_submission(res);
        return Ok(());
    }

    fn handle_event(&mut self, event: Event) {
        self.session.handle_event(&event, &self.action_tx);

        match &event {
            Event::GenerationStarted() => {}
            Event::GenerationProgress(progress) => {
                println!("{}", Paint::cyan(format_progress(progress)));
            }
            Event::GenerationFinished(_) | Event::GenerationFailed(_) => {
                if let Some(message) = self.session.chat.messages().last() {
                    if self.session.last_error.is_some() {
                        println!("{}", Paint::red(&message.content));
                    } else if !message.is_provisional() {
                        println!("{}", Paint::green(&message.content));
                    }
                }
                if self.session.last_error.is_none() && self.session.has_screens() {
                    println!("{}", format_screens(&self.session.model));
                }
                self.ask_questions();
            }
            Event::BuildSubmitted(job) | Event::BuildUpdated(job) => {
                if self.session.build.as_ref() != Some(job) {
                    return;
                }
                let line = format_build(job);
                match job.status {
                    BuildStatus::Done => println!("{}", Paint::green(line)),
                    BuildStatus::Error => println!("{}", Paint::red(line)),
                    _ => println!("{}", Paint::cyan(line)),
                }
            }
            Event::BuildSubmitFailed(err) => {
                println!("{}", Paint::red(format!("Cloud build was not started: {err}")));
            }
        }
    }

    fn ask_questions(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let flow = match &self.session.onboarding {
            Some(flow) => flow,
            None => return,
        };
        let first = match flow.questions.first() {
            Some(first) => first,
            None => return,
        };

        println!("{}", format_question(first, 0, flow.questions.len()));
        println!("Answer each question, or type /skip to start building.");
        self.pending = Some(PendingAnswers {
            index: 0,
            answers: HashMap::new(),
        });
    }

    fn build(&mut self) {
        if let Err(err) = self.session.start_build(&self.action_tx) {
            println!("{}", Paint::red(err.to_string()));
            return;
        }

        println!("{}", Paint::cyan("Submitting cloud build..."));
    }

    async fn export(&mut self, target: ExportTarget) {
        if target == ExportTarget::Apk {
            self.build();
            return;
        }
        if !self.session.has_screens() {
            println!("{}", Paint::red("Nothing to export yet, generate some screens first."));
            return;
        }

        let model = &self.session.model;
        let input = ExportInput::from_model(model, &self.theme_color);
        let res = match exporters::export(target, &input, None).await {
            Ok(Artifact::Files { files, .. }) => {
                self.writer.write(&model.display_name(), target, &files).await
            }
            Ok(Artifact::Pending(job)) => {
                println!("{}", format_build(&job));
                return;
            }
            Err(err) => Err(err),
        };

        match res {
            Ok(dir) => println!(
                "{}",
                Paint::green(format!("Exported {target} to {}", dir.display()))
            ),
            Err(err) => {
                tracing::error!(error = ?err, target = %target, "Export failed");
                println!("{}", Paint::red(format!("Export failed: {err}")));
            }
        }
    }
}
