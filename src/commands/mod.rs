pub mod shell;

use crate::handlers::vote::FormField;
use crate::i18n::Language;
use crate::models::Choice;

pub const USAGE: &str = "\
commands:
  help                                 show this text
  go <path>                            open a page (/, /votes, /admin, /admin/dashboard)
  lang <fr|ar>                         switch the interface language
  set <matricule|name|choice|opinion> <value>
  submit                               send the vote form
  stats                                show the live statistics
  refresh                              reload the current page
  login <username> <password>
  logout
  edit <id> <for|against> [opinion]
  delete <id>                          ask to delete a vote
  confirm                              delete the vote asked for
  cancel                               close the edit or delete dialog
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Go(String),
    Lang(Language),
    Set(FormField, String),
    Submit,
    Stats,
    Refresh,
    Login { username: String, password: String },
    Logout,
    Edit { id: String, choice: Choice, opinion: String },
    Delete { id: String },
    Confirm,
    Cancel,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (name, rest) = split_word(line);
    let command = match name.to_ascii_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "go" => {
            let (path, _) = split_word(rest);
            if path.is_empty() {
                return Err("usage: go <path>".to_string());
            }
            Command::Go(path.to_string())
        }
        "lang" => Command::Lang(rest.parse()?),
        "set" => {
            let (field, value) = split_word(rest);
            if field.is_empty() {
                return Err("usage: set <field> <value>".to_string());
            }
            Command::Set(field.parse()?, value.to_string())
        }
        "submit" => Command::Submit,
        "stats" => Command::Stats,
        "refresh" => Command::Refresh,
        "login" => {
            let (username, rest) = split_word(rest);
            let (password, _) = split_word(rest);
            if username.is_empty() || password.is_empty() {
                return Err("usage: login <username> <password>".to_string());
            }
            Command::Login { username: username.to_string(), password: password.to_string() }
        }
        "logout" => Command::Logout,
        "edit" => {
            let (id, rest) = split_word(rest);
            let (choice, opinion) = split_word(rest);
            if id.is_empty() || choice.is_empty() {
                return Err("usage: edit <id> <for|against> [opinion]".to_string());
            }
            Command::Edit { id: id.to_string(), choice: choice.parse()?, opinion: opinion.to_string() }
        }
        "delete" => {
            let (id, _) = split_word(rest);
            if id.is_empty() {
                return Err("usage: delete <id>".to_string());
            }
            Command::Delete { id: id.to_string() }
        }
        "confirm" | "yes" => Command::Confirm,
        "cancel" => Command::Cancel,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("Unknown command: {} (try `help`)", other)),
    };
    Ok(Some(command))
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(idx) => (&input[..idx], input[idx..].trim()),
        None => (input, ""),
    }
}
