use serde::Serialize;

/// One `@@` section of a file diff. `lines` keeps the raw content lines
/// with their `+`/`-`/space prefix intact.
#[derive(Debug, Clone, Serialize)]
pub struct Hunk {
    pub old_start: u64,
    pub old_lines: u64,
    pub new_start: u64,
    pub new_lines: u64,
    pub lines: Vec<String>,
}

/// All hunks for a single file in a diff.
#[derive(Debug, Clone, Serialize)]
pub struct FileDiff {
    pub old_path: String,
    pub new_path: String,
    pub hunks: Vec<Hunk>,
    pub is_new: bool,
    pub is_deleted: bool,
}

/// Aggregate counts over a parsed diff.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DiffStats {
    pub files: usize,
    pub lines: usize,
    pub added: usize,
    pub removed: usize,
}

/// Parse unified diff text into per-file structures.
///
/// Best-effort by construction: unrecognized lines are dropped and the
/// result is whatever structure the input supports, down to an empty
/// vec for input with no file headers.
pub fn parse(diff_text: &str) -> Vec<FileDiff> {
    let mut files = Vec::new();
    let mut current_file: Option<FileDiff> = None;
    let mut current_hunk: Option<Hunk> = None;

    for line in diff_text.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            if let Some((old_path, new_path)) = parse_git_paths(rest) {
                // Open hunk belongs to the previous file. Flush it first
                // so a file's trailing hunk is never lost.
                if let Some(mut file) = current_file.take() {
                    if let Some(hunk) = current_hunk.take() {
                        file.hunks.push(hunk);
                    }
                    files.push(file);
                }
                current_hunk = None;
                current_file = Some(FileDiff {
                    old_path,
                    new_path,
                    hunks: Vec::new(),
                    is_new: false,
                    is_deleted: false,
                });
            }
            continue;
        }

        if let Some(target) = line.strip_prefix("--- ") {
            if let Some(file) = current_file.as_mut() {
                if target.contains("/dev/null") {
                    file.is_new = true;
                }
            }
            continue;
        }

        if let Some(target) = line.strip_prefix("+++ ") {
            if let Some(file) = current_file.as_mut() {
                if target.contains("/dev/null") {
                    file.is_deleted = true;
                }
            }
            continue;
        }

        if line.starts_with("@@") {
            if let Some(hunk) = parse_hunk_header(line) {
                if let Some(prev) = current_hunk.take() {
                    if let Some(file) = current_file.as_mut() {
                        file.hunks.push(prev);
                    }
                }
                current_hunk = Some(hunk);
                continue;
            }
            // Malformed header, falls through and is dropped below.
        }

        if line.starts_with('+') || line.starts_with('-') || line.starts_with(' ') {
            if let Some(hunk) = current_hunk.as_mut() {
                hunk.lines.push(line.to_string());
            }
        }
        // Anything else (index lines, mode changes, rename metadata,
        // "\ No newline at end of file") is dropped.
    }

    if let Some(mut file) = current_file.take() {
        if let Some(hunk) = current_hunk.take() {
            file.hunks.push(hunk);
        }
        files.push(file);
    }

    files
}

/// Render a parsed diff as review-ready text, one section per file.
/// Each section opens with a `diff --git` path line so the output
/// re-parses to the same file and hunk counts it was built from.
pub fn format_for_review(files: &[FileDiff]) -> String {
    let mut out = String::new();
    for file in files {
        out.push_str(&format!(
            "diff --git a/{} b/{}\n",
            file.old_path, file.new_path
        ));
        let status = if file.is_new {
            "New file"
        } else if file.is_deleted {
            "Deleted"
        } else {
            "Modified"
        };
        out.push_str(&format!("Status: {}\n\n", status));

        for hunk in &file.hunks {
            out.push_str(&format!(
                "@@ -{},{} +{},{} @@\n",
                hunk.old_start, hunk.old_lines, hunk.new_start, hunk.new_lines
            ));
            for line in &hunk.lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
    }
    out
}

/// Count files, hunk lines, and added/removed lines in a parsed diff.
pub fn stats(files: &[FileDiff]) -> DiffStats {
    let mut stats = DiffStats {
        files: files.len(),
        ..Default::default()
    };
    for line in files.iter().flat_map(|f| &f.hunks).flat_map(|h| &h.lines) {
        stats.lines += 1;
        if line.starts_with('+') {
            stats.added += 1;
        } else if line.starts_with('-') {
            stats.removed += 1;
        }
    }
    stats
}

/// Split the remainder of a `diff --git` header into old and new paths.
/// The split is on the last ` b/`, so an old path containing that
/// substring still resolves the way the header grammar intends.
fn parse_git_paths(rest: &str) -> Option<(String, String)> {
    let rest = rest.strip_prefix("a/")?;
    let pos = rest.rfind(" b/")?;
    Some((rest[..pos].to_string(), rest[pos + 3..].to_string()))
}

/// Parse `@@ -<start>[,<lines>] +<start>[,<lines>] @@` with optional
/// trailing context. Returns None for lines that only look like headers.
fn parse_hunk_header(line: &str) -> Option<Hunk> {
    let rest = line.strip_prefix("@@ -")?;
    let (ranges, _) = rest.split_once(" @@")?;
    let (old, new) = ranges.split_once(" +")?;

    let (old_start, old_lines) = parse_range(old);
    let (new_start, new_lines) = parse_range(new);

    Some(Hunk {
        old_start,
        // A missing or zero count means a single line.
        old_lines: if old_lines == 0 { 1 } else { old_lines },
        new_start,
        new_lines: if new_lines == 0 { 1 } else { new_lines },
        lines: Vec::new(),
    })
}

fn parse_range(s: &str) -> (u64, u64) {
    match s.split_once(',') {
        Some((start, count)) => (start.parse().unwrap_or(0), count.parse().unwrap_or(0)),
        None => (s.parse().unwrap_or(0), 0),
    }
}
