use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::filesystem::{CatMode, FilesystemError, VirtualFilesystem};
use crate::shell::{Renderer, tokenize};

const HELP: &str = "\
mkdir <path>                 create a directory
rmdir <path>                 delete a directory and its contents
cd <path>                    change the working directory
cat <path>                   print a file
cat > <path> [text...]       write a file, replacing its contents
cat >> <path> [text...]      append to a file
rm <path>                    delete a file
rn <path> <name>             rename a file or directory
cp <target> <destination>    copy into a directory
mv <target> <destination>    move into a directory
ls [path]                    list a directory
whereis <pattern>            find nodes by name, '*' matches anything
pwd                          print the working directory
tree                         print every node grouped by depth
exit                         leave the shell";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mkdir(String),
    Rmdir(String),
    Cd(String),
    Cat {
        mode: CatMode,
        path: String,
        contents: String,
    },
    Rm(String),
    Rn {
        path: String,
        name: String,
    },
    Cp {
        target: String,
        destination: String,
    },
    Mv {
        target: String,
        destination: String,
    },
    Ls(Option<String>),
    Whereis(String),
    Pwd,
    Tree,
    Help,
    Exit,
}

impl Command {
    /// Parses a command line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ShellError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let words = tokenize(trimmed)?;
        let Some((name, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match name.as_str() {
            "mkdir" => Command::Mkdir(required(args, 0, "path")?),
            "rmdir" => Command::Rmdir(required(args, 0, "path")?),
            "cd" => Command::Cd(required(args, 0, "path")?),
            "cat" => Self::parse_cat(args)?,
            "rm" => Command::Rm(required(args, 0, "path")?),
            "rn" => Command::Rn {
                path: required(args, 0, "path")?,
                name: required(args, 1, "name")?,
            },
            "cp" => Command::Cp {
                target: required(args, 0, "target")?,
                destination: required(args, 1, "destination")?,
            },
            "mv" => Command::Mv {
                target: required(args, 0, "target")?,
                destination: required(args, 1, "destination")?,
            },
            "ls" => Command::Ls(args.first().cloned()),
            "whereis" => Command::Whereis(required(args, 0, "query")?),
            "pwd" => Command::Pwd,
            "tree" => Command::Tree,
            "help" => Command::Help,
            "exit" | "quit" => Command::Exit,
            other => {
                return UnknownCommandSnafu { command: other }.fail();
            }
        };

        Ok(Some(command))
    }

    fn parse_cat(args: &[String]) -> Result<Self, ShellError> {
        let (mode, rest) = match args.split_first() {
            Some((first, rest)) if first == ">" || first == ">>" => {
                (first.parse::<CatMode>().context(FilesystemSnafu)?, rest)
            }
            _ => (CatMode::Read, args),
        };

        Ok(Command::Cat {
            mode,
            path: required(rest, 0, "path")?,
            contents: rest.get(1..).map(|words| words.join(" ")).unwrap_or_default(),
        })
    }
}

fn required(args: &[String], index: usize, parameter: &str) -> Result<String, ShellError> {
    args.get(index)
        .cloned()
        .ok_or_else(|| FilesystemError::MissingArgumentError {
            parameter: parameter.to_string(),
        })
        .context(FilesystemSnafu)
}

/// What the caller should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Output(String),
    Silent,
    Exit,
}

/// Maps command lines onto a [`VirtualFilesystem`] and renders the results.
#[derive(Debug, Clone)]
pub struct Shell {
    filesystem: VirtualFilesystem,
    renderer: Renderer,
}

impl Shell {
    pub fn new(filesystem: VirtualFilesystem, color: bool) -> Self {
        Self {
            filesystem,
            renderer: Renderer::new(color),
        }
    }

    pub fn filesystem(&self) -> &VirtualFilesystem {
        &self.filesystem
    }

    pub fn renderer(&self) -> Renderer {
        self.renderer
    }

    /// Prompt showing the working directory.
    pub fn prompt(&self) -> String {
        format!("{} $ ", self.filesystem.pwd())
    }

    pub fn execute(&mut self, line: &str) -> Result<Outcome, ShellError> {
        match Command::parse(line)? {
            Some(command) => self.run(command),
            None => Ok(Outcome::Silent),
        }
    }

    pub fn run(&mut self, command: Command) -> Result<Outcome, ShellError> {
        debug!("Running {:?}", command);
        let fs = &mut self.filesystem;

        let output = match command {
            Command::Mkdir(path) => fs.mkdir(&path).map(|_| None),
            Command::Rmdir(path) => fs.rmdir(&path).map(|_| None),
            Command::Cd(path) => fs.cd(&path).map(|node| Some(fs.absolute_path(node))),
            Command::Cat {
                mode,
                path,
                contents,
            } => fs.cat(mode, &path, &contents),
            Command::Rm(path) => fs.rm(&path).map(|_| None),
            Command::Rn { path, name } => fs.rn(&path, &name).map(|_| None),
            Command::Cp {
                target,
                destination,
            } => fs.cp(target.as_str(), destination.as_str()).map(|_| None),
            Command::Mv {
                target,
                destination,
            } => fs.mv(target.as_str(), destination.as_str()).map(|_| None),
            Command::Ls(path) => fs
                .ls(path.as_deref())
                .map(|nodes| Some(self.renderer.listing(fs, &nodes))),
            Command::Whereis(query) => fs
                .whereis(&query)
                .map(|nodes| Some(self.renderer.paths(fs, &nodes))),
            Command::Pwd => Ok(Some(fs.pwd())),
            Command::Tree => Ok(Some(self.renderer.levels(fs))),
            Command::Help => Ok(Some(HELP.to_string())),
            Command::Exit => return Ok(Outcome::Exit),
        }
        .context(FilesystemSnafu)?;

        Ok(match output {
            Some(text) if !text.is_empty() => Outcome::Output(text),
            _ => Outcome::Silent,
        })
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ShellError {
    #[snafu(display("{}", source))]
    FilesystemError { source: FilesystemError },
    #[snafu(display("Unknown command '{}', try 'help'", command))]
    UnknownCommandError { command: String },
    #[snafu(display("Unterminated quote in '{}'", line))]
    UnterminatedQuoteError { line: String },
}
