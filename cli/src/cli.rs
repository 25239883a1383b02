use clap::Parser;
use markvault::error::{MarkvaultError, Result};
use markvault::model::{count_bookmarks, count_folders};
use markvault::{export, merge, parse, render};
use std::fs;
use std::path::PathBuf;

/// Convert browser bookmark exports into a passphrase-protected vault file.
///
/// Input files may be Netscape bookmark HTML or Chrome bookmark JSON;
/// the format is sniffed from content, the extension is only a hint.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Bookmark export files (HTML or JSON)
    #[arg(name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Vault passphrase; prompted when omitted (empty permitted)
    #[arg(short, long)]
    pub passphrase: Option<String>,

    /// Directory the vault file is written to
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Print the merged bookmark tree and exit without exporting
    #[arg(long)]
    pub preview: bool,
}

pub fn run(args: &Cli) -> Result<()> {
    let mut trees = Vec::new();
    for file in &args.files {
        // an unreadable or unrecognized file contributes an empty tree,
        // it never aborts the batch
        let nodes = match fs::read_to_string(file) {
            Ok(text) => parse::parse_any(&text),
            Err(e) => {
                log::debug!("could not read {}: {e}", file.display());
                Vec::new()
            }
        };

        if nodes.is_empty() {
            eprintln!("Warning: no bookmarks recognized in {}", file.display());
        } else {
            eprintln!(
                "✓ Parsed {} bookmark(s) from {}",
                count_bookmarks(&nodes),
                file.display()
            );
        }
        trees.push(nodes);
    }

    let merged = merge::merge(&trees);
    eprintln!(
        "✓ Merged into {} folder(s), {} unique bookmark(s)",
        count_folders(&merged),
        count_bookmarks(&merged)
    );

    if args.preview {
        print!("{}", render::render_preview(&merged));
        return Ok(());
    }

    let passphrase = match &args.passphrase {
        Some(p) => p.clone(),
        None => prompt_passphrase()?,
    };

    let result = export::export_tree(&merged, &passphrase)?;
    fs::create_dir_all(&args.output)?;
    let path = args.output.join(&result.filename);
    fs::write(&path, &result.bytes)?;
    eprintln!("✓ Wrote {} ({} bytes)", path.display(), result.bytes.len());

    Ok(())
}

fn prompt_passphrase() -> Result<String> {
    let first = rpassword::prompt_password("Vault passphrase (empty for none): ")
        .map_err(|e| MarkvaultError::InvalidInput(e.to_string()))?;
    let second = rpassword::prompt_password("Confirm passphrase: ")
        .map_err(|e| MarkvaultError::InvalidInput(e.to_string()))?;

    if first != second {
        return Err(MarkvaultError::InvalidInput(
            "passphrases do not match".to_string(),
        ));
    }
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use markvault::vault::VaultContainer;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn export_file(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{body}").unwrap();
        file
    }

    #[test]
    fn test_preview_run_does_not_export() {
        let file = export_file(r#"<DL><DT><A HREF="https://a.com">A</A></DL>"#);
        let out = tempdir().unwrap();
        let args = Cli {
            files: vec![file.path().to_path_buf()],
            passphrase: Some("pw".to_string()),
            output: out.path().to_path_buf(),
            preview: true,
        };
        run(&args).unwrap();
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_full_run_writes_a_vault_file() {
        let html = export_file(r#"<DL><DT><A HREF="https://dup.com">A</A></DL>"#);
        let json = export_file(
            r#"{"roots": {"other": {"children": [
                {"type": "url", "name": "Dup", "url": "https://dup.com"},
                {"type": "url", "name": "B", "url": "https://b.com"}
            ]}}}"#,
        );
        let out = tempdir().unwrap();
        let args = Cli {
            files: vec![html.path().to_path_buf(), json.path().to_path_buf()],
            passphrase: Some("pw".to_string()),
            output: out.path().to_path_buf(),
            preview: false,
        };
        run(&args).unwrap();

        let written: Vec<_> = fs::read_dir(out.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(written.len(), 1);

        let payload =
            VaultContainer::decrypt(&fs::read(&written[0]).unwrap(), "pw").unwrap();
        // https://dup.com deduplicated across the two files
        assert_eq!(payload.entries.len(), 2);
    }

    #[test]
    fn test_export_with_no_bookmarks_is_an_error() {
        let file = export_file("not an export at all");
        let out = tempdir().unwrap();
        let args = Cli {
            files: vec![file.path().to_path_buf()],
            passphrase: Some("".to_string()),
            output: out.path().to_path_buf(),
            preview: false,
        };
        let err = run(&args).unwrap_err();
        assert!(matches!(err, MarkvaultError::EmptyInput));
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }
}
