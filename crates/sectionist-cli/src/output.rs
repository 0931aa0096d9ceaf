use std::io::Write;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use serde::Serialize;

use sectionist_core::SectionMap;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Display name for a document path.
pub fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print one document's sections in reading order.
pub fn print_sections(
    w: &mut dyn Write,
    name: &str,
    sections: &SectionMap,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(
            w,
            "{} {}",
            name.bold(),
            format!("({} sections)", sections.len()).dimmed()
        )?;
    } else {
        writeln!(w, "{} ({} sections)", name, sections.len())?;
    }
    writeln!(w)?;

    for (i, (title, content)) in sections.iter().enumerate() {
        if color.enabled() {
            writeln!(w, "{} {}", format!("[{}]", i + 1).bold().yellow(), title.bold())?;
        } else {
            writeln!(w, "[{}] {}", i + 1, title)?;
        }
        for line in content.lines() {
            writeln!(w, "    {}", line)?;
        }
        writeln!(w)?;
    }

    if sections.is_empty() {
        let msg = "No rule-delimited sections found.";
        if color.enabled() {
            writeln!(w, "{}", msg.yellow())?;
        } else {
            writeln!(w, "{}", msg)?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct DocumentSections<'a> {
    file: String,
    sections: &'a SectionMap,
}

/// Write every document's sections as one JSON array.
pub fn write_json(w: &mut dyn Write, results: &[(PathBuf, SectionMap)]) -> std::io::Result<()> {
    let documents: Vec<DocumentSections<'_>> = results
        .iter()
        .map(|(path, sections)| DocumentSections {
            file: path.display().to_string(),
            sections,
        })
        .collect();
    serde_json::to_writer_pretty(&mut *w, &documents)?;
    writeln!(w)?;
    Ok(())
}
