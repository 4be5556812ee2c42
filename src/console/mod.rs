//! Line-oriented terminal front end.
//!
//! Reads commands from any async line source and writes to any async sink, so
//! the same loop serves stdin/stdout and scripted tests.
//!
//! Password and confirmation prompts are plain line reads: the terminal echoes
//! what is typed. Run it where the screen is not shared.

use crate::app::ChatApp;
use crate::error::SessionError;
use crate::models::{ Chat, DEFAULT_CHAT_TITLE };
use log::error;
use std::io;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines };

const SHORT_ID_LEN: usize = 8;

const HELP: &str =
    "Commands:
  /signup <username> [email]   create an account
  /login <username>            log in
  /logout                      log out
  /new [title]                 start a new chat
  /chats                       list your chats, most recent first
  /open <id>                   switch to a chat (an id prefix is enough)
  /rename <title>              rename the current chat
  /delete [id]                 delete a chat (default: the current one)
  /history                     show the current chat
  /ocr <image path>            extract text from an image
  /send-ocr                    send the last extracted text
  /help                        show this help
  /quit                        exit
Anything else is sent to the model in the current chat.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SignUp {
        username: String,
        email: String,
    },
    LogIn {
        username: String,
    },
    LogOut,
    New(Option<String>),
    Chats,
    Open(String),
    Rename(String),
    Delete(Option<String>),
    History,
    Ocr(String),
    SendOcr,
    Help,
    Quit,
    Say(String),
    Invalid(String),
}

fn non_empty(rest: &str) -> Option<String> {
    let rest = rest.trim();
    if rest.is_empty() { None } else { Some(rest.to_string()) }
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if !line.starts_with('/') {
        return Some(Command::Say(line.to_string()));
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let mut words = rest.split_whitespace();

    let command = match name {
        "/signup" =>
            match words.next() {
                Some(username) =>
                    Command::SignUp {
                        username: username.to_string(),
                        email: words.next().unwrap_or_default().to_string(),
                    },
                None => Command::Invalid("usage: /signup <username> [email]".to_string()),
            }
        "/login" =>
            match words.next() {
                Some(username) => Command::LogIn { username: username.to_string() },
                None => Command::Invalid("usage: /login <username>".to_string()),
            }
        "/logout" => Command::LogOut,
        "/new" => Command::New(non_empty(rest)),
        "/chats" => Command::Chats,
        "/open" =>
            match non_empty(rest) {
                Some(id) => Command::Open(id),
                None => Command::Invalid("usage: /open <id>".to_string()),
            }
        "/rename" =>
            match non_empty(rest) {
                Some(title) => Command::Rename(title),
                None => Command::Invalid("usage: /rename <title>".to_string()),
            }
        "/delete" => Command::Delete(non_empty(rest)),
        "/history" => Command::History,
        "/ocr" =>
            match non_empty(rest) {
                Some(path) => Command::Ocr(path),
                None => Command::Invalid("usage: /ocr <image path>".to_string()),
            }
        "/send-ocr" => Command::SendOcr,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => Command::Invalid(format!("unknown command {} (try /help)", other)),
    };
    Some(command)
}

fn short_id(chat_id: &str) -> &str {
    chat_id.get(..SHORT_ID_LEN).unwrap_or(chat_id)
}

fn describe_chat(chat_id: &str, chat: &Chat, current: bool) -> String {
    format!(
        "{} {}  {}  ({} messages, updated {})",
        if current { "*" } else { " " },
        short_id(chat_id),
        chat.title(),
        chat.messages().len(),
        chat.updated_at().format("%Y-%m-%d %H:%M")
    )
}

pub struct Console<R, W> {
    input: Lines<R>,
    output: W,
    ocr_draft: Option<String>,
}

impl<R, W> Console<R, W> where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin {
    pub fn new(reader: R, output: W) -> Self {
        Self {
            input: reader.lines(),
            output,
            ocr_draft: None,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    async fn say(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }

    async fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        self.output.write_all(label.as_bytes()).await?;
        self.output.flush().await?;
        self.input.next_line().await
    }

    async fn report(&mut self, err: &SessionError) -> io::Result<()> {
        if let SessionError::Persistence(e) = err {
            error!("Failed to save chat history: {}", e);
        }
        self.say(&format!("Error: {}", err)).await
    }

    pub async fn run(&mut self, app: &mut ChatApp) -> io::Result<()> {
        self.say("Welcome! Log in or sign up to start chatting. Type /help for commands.").await?;
        loop {
            let Some(line) = self.prompt("> ").await? else {
                break;
            };
            let Some(command) = parse_command(&line) else {
                continue;
            };
            if !self.handle(app, command).await? {
                break;
            }
        }
        Ok(())
    }

    /// Executes one command. Returns `false` when the user asked to quit.
    pub async fn handle(&mut self, app: &mut ChatApp, command: Command) -> io::Result<bool> {
        match command {
            Command::Quit => {
                return Ok(false);
            }
            Command::Help => self.say(HELP).await?,
            Command::Invalid(message) => self.say(&message).await?,
            Command::SignUp { username, email } => self.sign_up(app, &username, &email).await?,
            Command::LogIn { username } => self.log_in(app, &username).await?,
            Command::LogOut => {
                match app.log_out() {
                    Some(identity) => {
                        self.ocr_draft = None;
                        self.say(&format!("Logged out {}", identity.username())).await?;
                    }
                    None => self.say("Not logged in").await?,
                }
            }
            Command::New(title) => {
                let title = title.unwrap_or_else(|| DEFAULT_CHAT_TITLE.to_string());
                let created = app.session_mut().create_chat(&title);
                match created.and_then(|id| app.session_mut().select_chat(&id).map(|_| id)) {
                    Ok(id) => self.say(&format!("Started chat {} ({})", short_id(&id), title)).await?,
                    Err(e) => self.report(&e).await?,
                }
            }
            Command::Chats => self.list_chats(app).await?,
            Command::Open(prefix) => self.open_chat(app, &prefix).await?,
            Command::Rename(title) => {
                let result = match app.session().current_chat().map(str::to_string) {
                    Some(id) => app.session_mut().rename_chat(&id, &title),
                    None => {
                        self.say("No chat selected").await?;
                        return Ok(true);
                    }
                };
                match result {
                    Ok(()) => self.say(&format!("Renamed to {}", title)).await?,
                    Err(e) => self.report(&e).await?,
                }
            }
            Command::Delete(target) => self.delete_chat(app, target).await?,
            Command::History => self.show_history(app).await?,
            Command::Ocr(path) => self.run_ocr(app, &path).await?,
            Command::SendOcr => {
                match self.ocr_draft.take() {
                    Some(text) => self.send(app, &text).await?,
                    None => self.say("No extracted text yet; use /ocr <image path> first").await?,
                }
            }
            Command::Say(text) => self.send(app, &text).await?,
        }
        Ok(true)
    }

    async fn sign_up(&mut self, app: &mut ChatApp, username: &str, email: &str) -> io::Result<()> {
        let Some(password) = self.prompt("Password: ").await? else {
            return Ok(());
        };
        let Some(confirm) = self.prompt("Confirm Password: ").await? else {
            return Ok(());
        };
        match app.sign_up(username, &password, &confirm, email) {
            Ok(()) => self.say("User created successfully").await,
            Err(e) => self.say(&format!("Error: {}", e)).await,
        }
    }

    async fn log_in(&mut self, app: &mut ChatApp, username: &str) -> io::Result<()> {
        let Some(password) = self.prompt("Password: ").await? else {
            return Ok(());
        };
        match app.log_in(username, &password) {
            Ok(identity) => {
                self.ocr_draft = None;
                self.say(&format!("Logged in as {}", identity.username())).await
            }
            Err(e) => self.say(&format!("Error: {}", e)).await,
        }
    }

    async fn list_chats(&mut self, app: &ChatApp) -> io::Result<()> {
        let session = app.session();
        let lines: Vec<String> = match session.list_chats() {
            Ok(chats) => {
                let current = session.current_chat();
                chats
                    .iter()
                    .map(|(id, chat)| describe_chat(id, chat, current == Some(*id)))
                    .collect()
            }
            Err(e) => {
                return self.report(&e).await;
            }
        };
        if lines.is_empty() {
            return self.say("No chats yet; use /new or just start typing").await;
        }
        for line in lines {
            self.say(&line).await?;
        }
        Ok(())
    }

    fn resolve(app: &ChatApp, prefix: &str) -> Result<Result<String, String>, SessionError> {
        let chats = app.session().list_chats()?;
        let matches: Vec<&str> = chats
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| id.starts_with(prefix))
            .collect();
        Ok(match matches.as_slice() {
            [id] => Ok(id.to_string()),
            [] => Err(format!("No chat matches '{}'", prefix)),
            _ => Err(format!("'{}' matches {} chats; use more characters", prefix, matches.len())),
        })
    }

    async fn open_chat(&mut self, app: &mut ChatApp, prefix: &str) -> io::Result<()> {
        let chat_id = match Self::resolve(app, prefix) {
            Ok(Ok(id)) => id,
            Ok(Err(message)) => {
                return self.say(&message).await;
            }
            Err(e) => {
                return self.report(&e).await;
            }
        };
        if let Err(e) = app.session_mut().select_chat(&chat_id) {
            return self.report(&e).await;
        }
        self.show_history(app).await
    }

    async fn delete_chat(&mut self, app: &mut ChatApp, target: Option<String>) -> io::Result<()> {
        let chat_id = match target {
            Some(prefix) =>
                match Self::resolve(app, &prefix) {
                    Ok(Ok(id)) => id,
                    Ok(Err(message)) => {
                        return self.say(&message).await;
                    }
                    Err(e) => {
                        return self.report(&e).await;
                    }
                }
            None =>
                match app.session().current_chat() {
                    Some(id) => id.to_string(),
                    None => {
                        return self.say("No chat selected").await;
                    }
                }
        };
        match app.session_mut().delete_chat(&chat_id) {
            Ok(true) => self.say(&format!("Deleted chat {}", short_id(&chat_id))).await,
            Ok(false) => self.say("Chat was already gone").await,
            Err(e) => self.report(&e).await,
        }
    }

    async fn show_history(&mut self, app: &ChatApp) -> io::Result<()> {
        let session = app.session();
        let lines: Vec<String> = match session.current_chat() {
            None => vec!["No chat selected".to_string()],
            Some(id) =>
                match session.get_chat(id) {
                    Ok(chat) => {
                        let mut lines = vec![format!("== {} ==", chat.title())];
                        lines.extend(
                            chat
                                .messages()
                                .iter()
                                .map(|m| format!("{}> {}", m.role, m.content))
                        );
                        lines
                    }
                    Err(e) => {
                        return self.report(&e).await;
                    }
                }
        };
        for line in lines {
            self.say(&line).await?;
        }
        Ok(())
    }

    async fn run_ocr(&mut self, app: &ChatApp, path: &str) -> io::Result<()> {
        let image = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return self.say(&format!("Could not read {}: {}", path, e)).await;
            }
        };
        match app.extract_text(&image).await {
            Ok(text) if text.is_empty() => self.say("No text found in the image").await,
            Ok(text) => {
                self.say(&format!("Extracted Text:\n\n{}\n\n(/send-ocr to send it)", text)).await?;
                self.ocr_draft = Some(text);
                Ok(())
            }
            Err(e) => self.say(&format!("Error: {}", e)).await,
        }
    }

    async fn send(&mut self, app: &mut ChatApp, text: &str) -> io::Result<()> {
        if app.session().identity().is_none() {
            return self.say("Please log in or sign up first.").await;
        }
        let chat_id = match app.ensure_current_chat() {
            Ok(id) => id,
            Err(e) => {
                return self.report(&e).await;
            }
        };
        self.say("Thinking...").await?;
        match app.send_message(&chat_id, text).await {
            Ok(reply) => self.say(&format!("assistant> {}", reply)).await,
            Err(e) => self.report(&e).await,
        }
    }
}
