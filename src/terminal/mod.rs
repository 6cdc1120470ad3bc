//! Command interpreter behind the integrated terminal panel.
//!
//! Input is trimmed and the command word matched case-insensitively. Only `ls` and
//! `clean` touch the store; everything else is answered locally.

use chrono::Utc;
use serde::Serialize;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{FileNode, Project};
use crate::tree::{find_root, ChildIndex};

/// Lines shown when a terminal is first opened.
pub const WELCOME_LINES: [&str; 2] = [
    "Welcome to Workbench Terminal",
    "Type \"help\" for available commands",
];

const HELP_TEXT: &str = "Available commands:
  help     - Show this help message
  clear    - Clear the terminal
  ls       - List files in the project root
  pwd      - Show current directory
  echo     - Echo text
  date     - Show current date
  whoami   - Show current user
  clean    - Remove files no longer reachable from the root";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    Empty,
    Help,
    Clear,
    Ls,
    Pwd,
    Echo(String),
    Date,
    Whoami,
    Clean,
    Unknown(String),
}

impl TerminalCommand {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let (word, rest) = match input.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim_start()),
            None => (input, ""),
        };

        match word.to_lowercase().as_str() {
            "" => TerminalCommand::Empty,
            "echo" => TerminalCommand::Echo(rest.to_string()),
            _ if !rest.is_empty() => TerminalCommand::Unknown(input.to_string()),
            "help" => TerminalCommand::Help,
            "clear" => TerminalCommand::Clear,
            "ls" => TerminalCommand::Ls,
            "pwd" => TerminalCommand::Pwd,
            "date" => TerminalCommand::Date,
            "whoami" => TerminalCommand::Whoami,
            "clean" => TerminalCommand::Clean,
            _ => TerminalCommand::Unknown(input.to_string()),
        }
    }
}

/// Result of running one command.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput {
    /// The scrollback should be wiped.
    pub clear: bool,
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed_ids: Vec<String>,
}

impl CommandOutput {
    fn lines<I: IntoIterator<Item = String>>(lines: I) -> Self {
        Self {
            lines: lines.into_iter().collect(),
            ..Default::default()
        }
    }

    fn line(line: impl Into<String>) -> Self {
        Self::lines([line.into()])
    }
}

/// Run one line of terminal input against `project` on behalf of `user`.
pub async fn execute(
    repo: &Repository,
    user: Option<&str>,
    project: &Project,
    input: &str,
) -> Result<CommandOutput, AppError> {
    let command = TerminalCommand::parse(input);
    tracing::debug!(project_id = %project.id, ?command, "Terminal command");

    let output = match command {
        TerminalCommand::Empty => CommandOutput::default(),
        TerminalCommand::Help => CommandOutput::lines(HELP_TEXT.lines().map(str::to_string)),
        TerminalCommand::Clear => CommandOutput {
            clear: true,
            ..Default::default()
        },
        TerminalCommand::Pwd => CommandOutput::line(format!("/workspace/{}", project.name)),
        TerminalCommand::Echo(text) => CommandOutput::line(text),
        TerminalCommand::Date => CommandOutput::line(Utc::now().to_rfc2822()),
        TerminalCommand::Whoami => CommandOutput::line(user.unwrap_or("anonymous")),
        TerminalCommand::Ls => {
            let nodes = repo.list_project_nodes(user, &project.id).await?;
            let listing = list_root(&nodes);
            if listing.is_empty() {
                CommandOutput::default()
            } else {
                CommandOutput::line(listing)
            }
        }
        TerminalCommand::Clean => {
            let removed = repo.clean_project(user, &project.id).await?;
            CommandOutput {
                lines: vec![format!("Removed {} unreachable node(s)", removed.count())],
                removed_ids: removed.removed_ids,
                ..Default::default()
            }
        }
        TerminalCommand::Unknown(text) => CommandOutput::line(format!("Command not found: {}", text)),
    };

    Ok(output)
}

/// Names of the root's direct children, or of every node when there is no root.
/// Directories carry a trailing `/`.
fn list_root(nodes: &[FileNode]) -> String {
    let shown: Vec<&FileNode> = match find_root(nodes) {
        Some(root) => ChildIndex::build(nodes).children(&root.id).to_vec(),
        None => nodes.iter().collect(),
    };

    shown
        .iter()
        .map(|node| {
            if node.is_directory {
                format!("{}/", node.name)
            } else {
                node.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LineKind {
    Command,
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalLine {
    pub kind: LineKind,
    pub content: String,
}

/// Scrollback of one terminal panel.
#[derive(Debug, Clone, Serialize)]
pub struct TerminalBuffer {
    lines: Vec<TerminalLine>,
}

impl Default for TerminalBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalBuffer {
    pub fn new() -> Self {
        Self {
            lines: WELCOME_LINES
                .iter()
                .map(|line| TerminalLine {
                    kind: LineKind::Output,
                    content: line.to_string(),
                })
                .collect(),
        }
    }

    /// Append an echoed command and its output. `clear` wipes everything instead.
    pub fn record(&mut self, input: &str, output: &CommandOutput) {
        if output.clear {
            self.lines.clear();
            return;
        }

        self.lines.push(TerminalLine {
            kind: LineKind::Command,
            content: format!("$ {}", input),
        });
        self.lines
            .extend(output.lines.iter().map(|line| TerminalLine {
                kind: LineKind::Output,
                content: line.clone(),
            }));
    }

    pub fn lines(&self) -> &[TerminalLine] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::TestRepo;
    use crate::models::{CreateNodeRequest, CreateProjectRequest};
    use crate::tree::test_support::{dir, file, root};

    const ALICE: Option<&str> = Some("alice");

    #[test]
    fn test_parse_is_trimmed_and_case_insensitive() {
        assert_eq!(TerminalCommand::parse("  HELP "), TerminalCommand::Help);
        assert_eq!(TerminalCommand::parse("Ls"), TerminalCommand::Ls);
        assert_eq!(TerminalCommand::parse("   "), TerminalCommand::Empty);
        assert_eq!(
            TerminalCommand::parse("echo Hello  World"),
            TerminalCommand::Echo("Hello  World".to_string())
        );
        assert_eq!(TerminalCommand::parse("echo"), TerminalCommand::Echo(String::new()));
        assert_eq!(
            TerminalCommand::parse("rm -rf /"),
            TerminalCommand::Unknown("rm -rf /".to_string())
        );
        assert_eq!(
            TerminalCommand::parse("ls -la"),
            TerminalCommand::Unknown("ls -la".to_string())
        );
    }

    #[test]
    fn test_list_root_children_only() {
        let nodes = vec![
            root("r"),
            dir("src", "/src", "r"),
            file("main", "/src/main.js", "src"),
            file("readme", "/README.md", "r"),
        ];
        assert_eq!(list_root(&nodes), "src/  README.md");
    }

    #[test]
    fn test_list_without_root_shows_everything() {
        let nodes = vec![dir("src", "/src", "gone"), file("main", "/src/main.js", "src")];
        assert_eq!(list_root(&nodes), "src/  main.js");
    }

    #[test]
    fn test_buffer_records_and_clears() {
        let mut buffer = TerminalBuffer::new();
        assert_eq!(buffer.lines().len(), 2);

        buffer.record("echo hi", &CommandOutput::line("hi"));
        assert_eq!(buffer.lines().len(), 4);
        assert_eq!(buffer.lines()[2].content, "$ echo hi");
        assert_eq!(buffer.lines()[3].kind, LineKind::Output);

        buffer.record(
            "clear",
            &CommandOutput {
                clear: true,
                ..Default::default()
            },
        );
        assert!(buffer.lines().is_empty());
    }

    #[tokio::test]
    async fn test_execute_against_project() {
        let t = TestRepo::new().await;
        let project = t
            .repo
            .create_project(
                ALICE,
                &CreateProjectRequest {
                    name: "demo".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        t.repo
            .create_node(
                ALICE,
                &project.id,
                &CreateNodeRequest {
                    name: "src".to_string(),
                    path: "/src".to_string(),
                    is_directory: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let ls = execute(&t.repo, ALICE, &project, "ls").await.unwrap();
        assert_eq!(ls.lines, vec!["README.md  src/".to_string()]);

        let pwd = execute(&t.repo, ALICE, &project, "pwd").await.unwrap();
        assert_eq!(pwd.lines, vec!["/workspace/demo".to_string()]);

        let who = execute(&t.repo, ALICE, &project, "whoami").await.unwrap();
        assert_eq!(who.lines, vec!["alice".to_string()]);

        let clean = execute(&t.repo, ALICE, &project, "clean").await.unwrap();
        assert_eq!(clean.lines, vec!["Removed 0 unreachable node(s)".to_string()]);

        let unknown = execute(&t.repo, ALICE, &project, "make").await.unwrap();
        assert_eq!(unknown.lines, vec!["Command not found: make".to_string()]);

        let empty = execute(&t.repo, ALICE, &project, "").await.unwrap();
        assert!(empty.lines.is_empty());

        let help = execute(&t.repo, ALICE, &project, "help").await.unwrap();
        assert!(help.lines.iter().any(|l| l.trim_start().starts_with("clean")));
    }
}
