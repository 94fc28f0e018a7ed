use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::errors::{IvError, Result};

/// How the operator wants to pick files from the chosen directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Single,
    Multiple,
    All,
}

impl SelectionMode {
    pub const ALL: [SelectionMode; 3] = [
        SelectionMode::Single,
        SelectionMode::Multiple,
        SelectionMode::All,
    ];

    pub fn index(&self) -> usize {
        match self {
            SelectionMode::Single => 0,
            SelectionMode::Multiple => 1,
            SelectionMode::All => 2,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SelectionMode::Single => "Plot one set of IV Data",
            SelectionMode::Multiple => "Plot selection of IV Data",
            SelectionMode::All => "Plot all IV Data",
        }
    }
}

impl FromStr for SelectionMode {
    type Err = IvError;

    fn from_str(mode: &str) -> Result<Self> {
        match mode.trim().to_lowercase().as_str() {
            "0" | "single" | "one" => Ok(SelectionMode::Single),
            "1" | "multiple" | "selection" => Ok(SelectionMode::Multiple),
            "2" | "all" => Ok(SelectionMode::All),
            _ => Err(IvError::InvalidSelection(format!(
                "unknown mode {:?} (use 0, 1 or 2)",
                mode
            ))),
        }
    }
}

pub trait DirectorySelector {
    /// Returns an existing directory holding sweep files.
    fn select_directory(&mut self) -> Result<PathBuf>;
}

pub trait ModeSelector {
    fn select_mode(&mut self) -> Result<SelectionMode>;
}

pub trait FileSelector {
    /// Returns a non-empty, ordered list of file names inside `dir`.
    fn select_files(&mut self, dir: &Path, mode: SelectionMode) -> Result<Vec<String>>;
}

fn sorted_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| keep(&entry.path()))
        .filter_map(|entry| entry.file_name().to_str().map(String::from))
        .collect();
    names.sort();
    Ok(names)
}

pub fn list_subdirectories(base: &Path) -> Result<Vec<String>> {
    sorted_entries(base, |p| p.is_dir())
}

pub fn list_data_files(dir: &Path) -> Result<Vec<String>> {
    sorted_entries(dir, |p| p.is_file())
}

/// Parses a menu answer as an index into a list of `len` entries.
fn parse_index(choice: &str, len: usize) -> Option<usize> {
    if choice.is_empty() || !choice.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    choice.parse::<usize>().ok().filter(|&i| i < len)
}

/// Numbered-menu prompts over any line-based input and output.
///
/// Every prompt runs as a request, validate, retry loop. End of input cancels
/// the session; `max_attempts` optionally bounds the number of rejected
/// answers per prompt.
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
    data_root: PathBuf,
    max_attempts: Option<u32>,
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W, data_root: impl Into<PathBuf>) -> Self {
        Self {
            input,
            output,
            data_root: data_root.into(),
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts.filter(|&n| n > 0);
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn say(&mut self, text: impl AsRef<str>) -> Result<()> {
        writeln!(self.output, "{}", text.as_ref())?;
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.say("")?;
            return Err(IvError::Cancelled);
        }
        Ok(line.trim().to_string())
    }

    fn retry<T, F>(&mut self, mut attempt: F) -> Result<T>
    where
        F: FnMut(&mut Self) -> Result<Option<T>>,
    {
        let mut rejected = 0u32;
        loop {
            if let Some(value) = attempt(self)? {
                return Ok(value);
            }
            rejected += 1;
            if self.max_attempts.map_or(false, |max| rejected >= max) {
                warn!(rejected, "giving up after repeated invalid answers");
                return Err(IvError::Cancelled);
            }
        }
    }

    fn list_numbered(&mut self, items: &[String]) -> Result<()> {
        for (idx, item) in items.iter().enumerate() {
            writeln!(self.output, "{}: {}", idx, item)?;
        }
        Ok(())
    }

    fn ask_custom_directory(&mut self, prompt: &str) -> Result<Option<PathBuf>> {
        let answer = self.ask(prompt)?;
        let path = PathBuf::from(&answer);
        if !answer.is_empty() && path.is_dir() {
            self.say(format!("You chose the directory: {}", path.display()))?;
            Ok(Some(path))
        } else {
            self.say("Invalid directory path. Please try again.")?;
            Ok(None)
        }
    }

    /// Gathers indices one at a time until `stop`. Each entry is its own
    /// prompt, so the attempt bound resets after every accepted file.
    fn collect_files(&mut self, files: &[String]) -> Result<Vec<String>> {
        self.say("Enter file number to plot one by one. Type 'stop' to stop.")?;
        self.list_numbered(files)?;
        let mut selected: Vec<String> = Vec::new();
        loop {
            let entry = self.retry(|p| {
                let choice = p.ask("Enter the number of your choice: ")?;
                if choice.eq_ignore_ascii_case("stop") {
                    if selected.is_empty() {
                        p.say("No files selected yet. Please choose at least one file.")?;
                        return Ok(None);
                    }
                    return Ok(Some(None));
                }
                match parse_index(&choice, files.len()) {
                    Some(i) => Ok(Some(Some(i))),
                    None => {
                        p.say("File not found. Please enter a valid file number.")?;
                        Ok(None)
                    }
                }
            })?;
            match entry {
                Some(i) => selected.push(files[i].clone()),
                None => return Ok(selected),
            }
        }
    }
}

impl<R: BufRead, W: Write> DirectorySelector for ConsolePrompter<R, W> {
    fn select_directory(&mut self) -> Result<PathBuf> {
        let base = self.data_root.clone();
        if !base.is_dir() {
            self.say(format!("The directory {} does not exist.", base.display()))?;
            let dir = self.retry(|p| {
                p.ask_custom_directory("Please enter the full path of the data directory: ")
            })?;
            self.say("")?;
            return Ok(dir);
        }

        let directories = list_subdirectories(&base)?;
        if directories.is_empty() {
            self.say(format!("No directories found in {}.", base.display()))?;
            return Err(IvError::NoData(format!(
                "no directories found in {}",
                base.display()
            )));
        }

        let dir = self.retry(|p| {
            p.say("Please choose one of the following directories:")?;
            p.list_numbered(&directories)?;
            let choice = p.ask(
                "Enter the number of your choice or type 'custom' for a custom directory: ",
            )?;
            if let Some(i) = parse_index(&choice, directories.len()) {
                let path = base.join(&directories[i]);
                p.say(format!("You chose: {}", path.display()))?;
                Ok(Some(path))
            } else if choice.eq_ignore_ascii_case("custom") {
                p.ask_custom_directory("Enter the full path of the data directory: ")
            } else {
                p.say("Invalid choice, please choose a valid option.")?;
                Ok(None)
            }
        })?;
        self.say("")?;
        debug!(directory = %dir.display(), "directory selected");
        Ok(dir)
    }
}

impl<R: BufRead, W: Write> ModeSelector for ConsolePrompter<R, W> {
    fn select_mode(&mut self) -> Result<SelectionMode> {
        let mode = self.retry(|p| {
            p.say("Please choose one of the following options:")?;
            for mode in SelectionMode::ALL {
                p.say(format!("Option {}: {}", mode.index(), mode.description()))?;
            }
            let choice = p.ask("Enter the number of your choice: ")?;
            match parse_index(&choice, SelectionMode::ALL.len()) {
                Some(i) => {
                    let mode = SelectionMode::ALL[i];
                    p.say(format!("You chose: Option {}: {}", i, mode.description()))?;
                    Ok(Some(mode))
                }
                None => {
                    p.say("Invalid choice, please choose a valid option.")?;
                    Ok(None)
                }
            }
        })?;
        self.say("")?;
        Ok(mode)
    }
}

impl<R: BufRead, W: Write> FileSelector for ConsolePrompter<R, W> {
    fn select_files(&mut self, dir: &Path, mode: SelectionMode) -> Result<Vec<String>> {
        let files = list_data_files(dir)?;
        if files.is_empty() {
            self.say("No files found in the directory.")?;
            return Err(IvError::NoData(format!(
                "no files found in {}",
                dir.display()
            )));
        }

        let chosen = match mode {
            SelectionMode::Single => self.retry(|p| {
                p.say("Please choose a file to plot:")?;
                p.list_numbered(&files)?;
                let choice = p.ask("Enter the number of your choice: ")?;
                match parse_index(&choice, files.len()) {
                    Some(i) => {
                        p.say(format!("You chose: {}", files[i]))?;
                        Ok(Some(vec![files[i].clone()]))
                    }
                    None => {
                        p.say("Invalid choice. Please try again.")?;
                        Ok(None)
                    }
                }
            })?,
            SelectionMode::Multiple => self.collect_files(&files)?,
            SelectionMode::All => {
                self.say("All files will be selected.")?;
                files
            }
        };

        self.say(format!("You chose: {}", chosen.join(", ")))?;
        self.say("")?;
        debug!(count = chosen.len(), "files selected");
        Ok(chosen)
    }
}

/// Answers supplied up front, typically from the command line.
#[derive(Debug, Clone, Default)]
pub struct Presets {
    pub directory: Option<PathBuf>,
    pub mode: Option<SelectionMode>,
    pub files: Vec<String>,
}

/// Uses presets where given and falls back to `inner` for the rest.
pub struct WithPresets<S> {
    presets: Presets,
    inner: S,
}

impl<S> WithPresets<S> {
    pub fn new(presets: Presets, inner: S) -> Self {
        Self { presets, inner }
    }
}

impl<S: DirectorySelector> DirectorySelector for WithPresets<S> {
    fn select_directory(&mut self) -> Result<PathBuf> {
        match &self.presets.directory {
            Some(dir) if dir.is_dir() => Ok(dir.clone()),
            Some(dir) => Err(IvError::InvalidSelection(format!(
                "not a directory: {}",
                dir.display()
            ))),
            None => self.inner.select_directory(),
        }
    }
}

impl<S: ModeSelector> ModeSelector for WithPresets<S> {
    fn select_mode(&mut self) -> Result<SelectionMode> {
        if !self.presets.files.is_empty() {
            return Ok(SelectionMode::Multiple);
        }
        match self.presets.mode {
            Some(mode) => Ok(mode),
            None => self.inner.select_mode(),
        }
    }
}

impl<S: FileSelector> FileSelector for WithPresets<S> {
    fn select_files(&mut self, dir: &Path, mode: SelectionMode) -> Result<Vec<String>> {
        if self.presets.files.is_empty() {
            return self.inner.select_files(dir, mode);
        }
        let available = list_data_files(dir)?;
        for name in &self.presets.files {
            if !available.contains(name) {
                return Err(IvError::InvalidSelection(format!(
                    "{} is not a file in {}",
                    name,
                    dir.display()
                )));
            }
        }
        Ok(self.presets.files.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn prompter(input: &str, root: &Path) -> ConsolePrompter<Cursor<Vec<u8>>, Vec<u8>> {
        ConsolePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), root)
    }

    fn data_dir_with(files: &[&str]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for f in files {
            fs::write(tmp.path().join(f), "header\n1 2\n").unwrap();
        }
        tmp
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0", 3), Some(0));
        assert_eq!(parse_index("2", 3), Some(2));
        assert_eq!(parse_index("3", 3), None);
        assert_eq!(parse_index("-1", 3), None);
        assert_eq!(parse_index("+1", 3), None);
        assert_eq!(parse_index("", 3), None);
        assert_eq!(parse_index("one", 3), None);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("0".parse::<SelectionMode>().unwrap(), SelectionMode::Single);
        assert_eq!("All".parse::<SelectionMode>().unwrap(), SelectionMode::All);
        assert!(matches!(
            "3".parse::<SelectionMode>(),
            Err(IvError::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_mode_reprompts_until_valid() {
        let tmp = TempDir::new().unwrap();
        let mut p = prompter("9\nx\n1\n", tmp.path());
        assert_eq!(p.select_mode().unwrap(), SelectionMode::Multiple);
        let out = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(out.matches("Invalid choice").count(), 2);
    }

    #[test]
    fn test_end_of_input_cancels() {
        let tmp = TempDir::new().unwrap();
        let mut p = prompter("7\n", tmp.path());
        assert!(matches!(p.select_mode(), Err(IvError::Cancelled)));
    }

    #[test]
    fn test_max_attempts_cancels() {
        let tmp = TempDir::new().unwrap();
        let mut p = prompter("a\nb\n0\n", tmp.path()).with_max_attempts(Some(2));
        assert!(matches!(p.select_mode(), Err(IvError::Cancelled)));
    }

    #[test]
    fn test_directory_by_index() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("b_run")).unwrap();
        fs::create_dir(root.path().join("a_run")).unwrap();
        fs::write(root.path().join("notes.txt"), "").unwrap();
        let mut p = prompter("1\n", root.path());
        assert_eq!(p.select_directory().unwrap(), root.path().join("b_run"));
    }

    #[test]
    fn test_directory_custom_path() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("run")).unwrap();
        let other = TempDir::new().unwrap();
        let input = format!("custom\n/definitely/not/here\ncustom\n{}\n", other.path().display());
        let mut p = prompter(&input, root.path());
        assert_eq!(p.select_directory().unwrap(), other.path());
    }

    #[test]
    fn test_missing_root_asks_for_path() {
        let other = TempDir::new().unwrap();
        let input = format!("{}\n", other.path().display());
        let mut p = prompter(&input, Path::new("/definitely/not/here"));
        assert_eq!(p.select_directory().unwrap(), other.path());
    }

    #[test]
    fn test_root_without_subdirectories_is_no_data() {
        let root = data_dir_with(&["a.txt"]);
        let mut p = prompter("0\n", root.path());
        assert!(matches!(p.select_directory(), Err(IvError::NoData(_))));
    }

    #[test]
    fn test_single_file() {
        let dir = data_dir_with(&["b.txt", "a.txt"]);
        let mut p = prompter("5\n1\n", dir.path());
        let files = p.select_files(dir.path(), SelectionMode::Single).unwrap();
        assert_eq!(files, vec!["b.txt".to_string()]);
    }

    #[test]
    fn test_multiple_files_until_stop() {
        let dir = data_dir_with(&["a.txt", "b.txt", "c.txt"]);
        let mut p = prompter("stop\n2\nnope\n0\nSTOP\n", dir.path());
        let files = p.select_files(dir.path(), SelectionMode::Multiple).unwrap();
        assert_eq!(files, vec!["c.txt".to_string(), "a.txt".to_string()]);
    }

    #[test]
    fn test_attempt_bound_resets_after_each_pick() {
        let dir = data_dir_with(&["a.txt", "b.txt", "c.txt"]);
        let mut p = prompter("0\nx\n1\ny\n2\nstop\n", dir.path()).with_max_attempts(Some(2));
        let files = p.select_files(dir.path(), SelectionMode::Multiple).unwrap();
        assert_eq!(
            files,
            vec!["a.txt".to_string(), "b.txt".to_string(), "c.txt".to_string()]
        );
    }

    #[test]
    fn test_repeated_typos_within_one_entry_cancel() {
        let dir = data_dir_with(&["a.txt", "b.txt"]);
        let mut p = prompter("0\nx\ny\n1\nstop\n", dir.path()).with_max_attempts(Some(2));
        assert!(matches!(
            p.select_files(dir.path(), SelectionMode::Multiple),
            Err(IvError::Cancelled)
        ));
    }

    #[test]
    fn test_all_files_without_prompting() {
        let dir = data_dir_with(&["b.txt", "a.txt"]);
        let mut p = prompter("", dir.path());
        let files = p.select_files(dir.path(), SelectionMode::All).unwrap();
        assert_eq!(files, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn test_empty_directory_is_no_data() {
        let dir = TempDir::new().unwrap();
        let mut p = prompter("0\n", dir.path());
        assert!(matches!(
            p.select_files(dir.path(), SelectionMode::Single),
            Err(IvError::NoData(_))
        ));
    }

    #[test]
    fn test_presets_skip_prompts() {
        let dir = data_dir_with(&["a.txt", "b.txt"]);
        let presets = Presets {
            directory: Some(dir.path().to_path_buf()),
            mode: None,
            files: vec!["b.txt".to_string()],
        };
        let mut s = WithPresets::new(presets, prompter("", dir.path()));
        let chosen_dir = s.select_directory().unwrap();
        let mode = s.select_mode().unwrap();
        assert_eq!(mode, SelectionMode::Multiple);
        assert_eq!(s.select_files(&chosen_dir, mode).unwrap(), vec!["b.txt".to_string()]);
    }

    #[test]
    fn test_presets_reject_unknown_file() {
        let dir = data_dir_with(&["a.txt"]);
        let presets = Presets {
            directory: None,
            mode: None,
            files: vec!["missing.txt".to_string()],
        };
        let mut s = WithPresets::new(presets, prompter("", dir.path()));
        assert!(matches!(
            s.select_files(dir.path(), SelectionMode::Multiple),
            Err(IvError::InvalidSelection(_))
        ));
    }
}
