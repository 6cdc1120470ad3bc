//! Starter template catalog.
//!
//! A template is a flat list of directory and file entries addressed by absolute path.
//! [`plan`] orders them so every parent directory exists before its children; the
//! repository turns the plan into rows under the project's root.

use serde::{Deserialize, Serialize};

use crate::tree::{base_name, parent_path};

/// Keys of the built-in templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKey {
    Blank,
    React,
    Node,
    Python,
}

impl TemplateKey {
    pub const ALL: [TemplateKey; 4] = [
        TemplateKey::Blank,
        TemplateKey::React,
        TemplateKey::Node,
        TemplateKey::Python,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKey::Blank => "blank",
            TemplateKey::React => "react",
            TemplateKey::Node => "node",
            TemplateKey::Python => "python",
        }
    }

    /// Resolve a client-supplied key. Unknown keys fall back to [`TemplateKey::Blank`].
    pub fn resolve(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "react" => TemplateKey::React,
            "node" | "nodejs" | "node.js" => TemplateKey::Node,
            "python" => TemplateKey::Python,
            "blank" => TemplateKey::Blank,
            other => {
                tracing::debug!("Unknown template key {:?}, using blank", other);
                TemplateKey::Blank
            }
        }
    }

    pub fn entries(&self) -> &'static [TemplateEntry] {
        match self {
            TemplateKey::Blank => &[],
            TemplateKey::React => REACT,
            TemplateKey::Node => NODE,
            TemplateKey::Python => PYTHON,
        }
    }
}

/// One directory or file of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateEntry {
    pub path: &'static str,
    pub is_directory: bool,
    pub content: &'static str,
    pub language: Option<&'static str>,
}

const fn dir(path: &'static str) -> TemplateEntry {
    TemplateEntry {
        path,
        is_directory: true,
        content: "",
        language: None,
    }
}

const fn file(path: &'static str, language: &'static str, content: &'static str) -> TemplateEntry {
    TemplateEntry {
        path,
        is_directory: false,
        content,
        language: Some(language),
    }
}

/// A template entry with its name and parent path worked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedNode {
    pub name: String,
    pub path: String,
    pub parent_path: String,
    pub is_directory: bool,
    pub content: String,
    pub language: Option<String>,
}

/// Directories first in listed order, then files in listed order.
pub fn plan(key: TemplateKey) -> Vec<PlannedNode> {
    let (dirs, files): (Vec<&TemplateEntry>, Vec<&TemplateEntry>) =
        key.entries().iter().partition(|entry| entry.is_directory);

    dirs.into_iter()
        .chain(files)
        .map(|entry| PlannedNode {
            name: base_name(entry.path).to_string(),
            path: entry.path.to_string(),
            parent_path: parent_path(entry.path).unwrap_or("/").to_string(),
            is_directory: entry.is_directory,
            content: entry.content.to_string(),
            language: entry.language.map(str::to_string),
        })
        .collect()
}

const REACT: &[TemplateEntry] = &[
    dir("/public"),
    dir("/src"),
    dir("/src/components"),
    file(
        "/package.json",
        "json",
        r#"{
  "name": "react-app",
  "version": "0.1.0",
  "private": true,
  "dependencies": {
    "react": "^18.2.0",
    "react-dom": "^18.2.0"
  },
  "scripts": {
    "start": "react-scripts start",
    "build": "react-scripts build"
  }
}
"#,
    ),
    file(
        "/public/index.html",
        "html",
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <title>React App</title>
  </head>
  <body>
    <div id="root"></div>
  </body>
</html>
"#,
    ),
    file(
        "/src/index.js",
        "javascript",
        r#"import React from "react";
import { createRoot } from "react-dom/client";
import App from "./App";

createRoot(document.getElementById("root")).render(<App />);
"#,
    ),
    file(
        "/src/App.js",
        "javascript",
        r#"import Header from "./components/Header";
import "./App.css";

export default function App() {
  return (
    <div className="app">
      <Header title="Hello, React!" />
    </div>
  );
}
"#,
    ),
    file(
        "/src/App.css",
        "css",
        r#".app {
  font-family: sans-serif;
  text-align: center;
}
"#,
    ),
    file(
        "/src/components/Header.js",
        "javascript",
        r#"export default function Header({ title }) {
  return <h1>{title}</h1>;
}
"#,
    ),
];

const NODE: &[TemplateEntry] = &[
    dir("/src"),
    file(
        "/package.json",
        "json",
        r#"{
  "name": "node-app",
  "version": "0.1.0",
  "main": "src/index.js",
  "scripts": {
    "start": "node src/index.js"
  }
}
"#,
    ),
    file(
        "/src/index.js",
        "javascript",
        r#"const http = require("http");

const port = process.env.PORT || 3000;

http
  .createServer((req, res) => {
    res.end("Hello from Node.js!");
  })
  .listen(port, () => console.log(`Listening on ${port}`));
"#,
    ),
    file("/.gitignore", "plaintext", "node_modules/\n"),
];

const PYTHON: &[TemplateEntry] = &[
    dir("/app"),
    file(
        "/main.py",
        "python",
        r#"from app.greeting import greet


if __name__ == "__main__":
    print(greet("Python"))
"#,
    ),
    file("/app/__init__.py", "python", ""),
    file(
        "/app/greeting.py",
        "python",
        r#"def greet(name: str) -> str:
    return f"Hello, {name}!"
"#,
    ),
    file("/requirements.txt", "plaintext", ""),
];
