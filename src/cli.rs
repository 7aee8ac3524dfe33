//! Command-line interface for applying edit scripts to files
//!
//! Supports:
//! - Checking a script against a file without touching it
//! - Applying a script, optionally saving the undo and reporting regions
//! - Replaying a saved undo, optionally saving the redo

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::buffer::{RopeBuffer, StringBuffer, TextBuffer, TextBufferMut};
use crate::config::{BufferBackend, EditConfig};
use crate::edit::{EditPath, TextEdit};
use crate::processor::{EditProcessor, EditRoot, EditStyle};
use crate::script::{self, EditScript};

/// Apply atomic, undoable edit trees to text files
#[derive(Parser, Debug)]
#[command(name = "textedit", version, about = "Apply edit trees to text files")]
pub struct CliArgs {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that a script can be applied to a file
    Check {
        file: PathBuf,
        script: PathBuf,
    },
    /// Apply a script to a file
    Apply(ApplyArgs),
    /// Replay a saved undo on a file
    Undo(UndoArgs),
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    pub file: PathBuf,
    pub script: PathBuf,

    /// Write the result here instead of back to FILE
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Save the undo edit (YAML, or JSON with a .json extension)
    #[arg(long, value_name = "PATH")]
    pub undo_out: Option<PathBuf>,

    /// Don't capture an undo edit
    #[arg(long, conflicts_with = "undo_out")]
    pub no_undo: bool,

    /// Print where every edit ended up
    #[arg(long)]
    pub regions: bool,
}

#[derive(Args, Debug)]
pub struct UndoArgs {
    pub file: PathBuf,
    pub undo: PathBuf,

    /// Write the result here instead of back to FILE
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Save the redo edit
    #[arg(long, value_name = "PATH")]
    pub redo_out: Option<PathBuf>,
}

impl ApplyArgs {
    fn style(&self, config: &EditConfig) -> EditStyle {
        let mut style = config.style();
        if self.no_undo {
            style.remove(EditStyle::CREATE_UNDO);
        }
        if self.undo_out.is_some() {
            style.insert(EditStyle::CREATE_UNDO);
        }
        if self.regions {
            style.insert(EditStyle::UPDATE_REGIONS);
        }
        style
    }
}

/// Run the parsed command
pub fn run(args: CliArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => EditConfig::load_from(path),
        None => EditConfig::load(),
    };
    match config.backend {
        BufferBackend::Rope => run_with::<RopeBuffer>(args.command, &config),
        BufferBackend::String => run_with::<StringBuffer>(args.command, &config),
    }
}

/// Buffers the command line tool can load files into
trait FileBuffer: TextBufferMut + Sized {
    fn from_text(text: &str) -> Self;
}

impl FileBuffer for RopeBuffer {
    fn from_text(text: &str) -> Self {
        RopeBuffer::from_text(text)
    }
}

impl FileBuffer for StringBuffer {
    fn from_text(text: &str) -> Self {
        StringBuffer::from_text(text)
    }
}

fn run_with<B: FileBuffer>(command: Command, config: &EditConfig) -> Result<()> {
    match command {
        Command::Check { file, script } => {
            let mut buffer: B = load_buffer(&file)?;
            let edit = load_script(&script)?;
            let mut processor = EditProcessor::new(&mut buffer, edit, EditStyle::NONE);
            if let Err(fault) = processor.check() {
                bail!("{} cannot be applied to {}: {}", script.display(), file.display(), fault);
            }
            println!("ok");
            Ok(())
        }
        Command::Apply(apply) => {
            let style = apply.style(config);
            let mut buffer: B = load_buffer(&apply.file)?;
            let edit = load_script(&apply.script)?;

            let mut processor = EditProcessor::new(&mut buffer, edit, style);
            let undo = processor
                .perform_edits()
                .with_context(|| format!("Failed to apply {}", apply.script.display()))?;
            let root = processor.into_root();

            if style.contains(EditStyle::UPDATE_REGIONS) {
                if let EditRoot::Tree(edit) = &root {
                    print_regions(edit, &EditPath::root(), &buffer);
                }
            }
            if let Some(path) = &apply.undo_out {
                script::save_undo(path, &undo)
                    .with_context(|| format!("Failed to save undo to {}", path.display()))?;
                tracing::info!(steps = undo.len(), "saved undo to {}", path.display());
            }
            write_buffer(apply.output.as_deref().unwrap_or(&apply.file), &buffer)
        }
        Command::Undo(undo_args) => {
            let mut buffer: B = load_buffer(&undo_args.file)?;
            let undo = script::load_undo(&undo_args.undo)
                .with_context(|| format!("Failed to load undo {}", undo_args.undo.display()))?;

            let style = if undo_args.redo_out.is_some() {
                EditStyle::CREATE_UNDO
            } else {
                EditStyle::NONE
            };
            let redo = EditProcessor::new(&mut buffer, undo, style)
                .perform_edits()
                .with_context(|| format!("Failed to replay {}", undo_args.undo.display()))?;

            if let Some(path) = &undo_args.redo_out {
                script::save_undo(path, &redo)
                    .with_context(|| format!("Failed to save redo to {}", path.display()))?;
            }
            write_buffer(
                undo_args.output.as_deref().unwrap_or(&undo_args.file),
                &buffer,
            )
        }
    }
}

fn load_buffer<B: FileBuffer>(path: &Path) -> Result<B> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(B::from_text(&text))
}

fn load_script(path: &Path) -> Result<TextEdit> {
    let script = EditScript::load(path)
        .with_context(|| format!("Failed to load script {}", path.display()))?;
    Ok(script.into_edit()?)
}

fn write_buffer<B: TextBuffer>(path: &Path, buffer: &B) -> Result<()> {
    std::fs::write(path, buffer.content())
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// One line per edit: path, kind and 1-based line:column span, or
/// `deleted` for edits overwritten by a replacing or deleting parent
fn print_regions<B: TextBuffer>(edit: &TextEdit, path: &EditPath, buffer: &B) {
    for line in region_lines(edit, path, buffer) {
        println!("{}", line);
    }
}

fn region_lines<B: TextBuffer>(edit: &TextEdit, path: &EditPath, buffer: &B) -> Vec<String> {
    let mut lines = Vec::new();
    if edit.is_deleted() {
        lines.push(format!("{}\t{}\tdeleted", path, edit.kind().name()));
    } else if let Some(region) = edit.region() {
        let (start_line, start_col) = buffer.offset_to_position(region.offset);
        let (end_line, end_col) = buffer.offset_to_position(region.end());
        lines.push(format!(
            "{}\t{}\t{}:{}-{}:{}",
            path,
            edit.kind().name(),
            start_line + 1,
            start_col + 1,
            end_line + 1,
            end_col + 1
        ));
    }
    for (index, child) in edit.children().iter().enumerate() {
        lines.extend(region_lines(child, &path.child(index), buffer));
    }
    lines
}
