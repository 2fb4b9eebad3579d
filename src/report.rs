//! Plain-text rendering of reports, plans and package trees for the CLI.

use crate::models::{EntryKind, PackageEntry, PlanAction, RenamePlan, VerificationReport};
use crate::services::{BatchReport, FolderOutcome, StagingReport};
use std::collections::BTreeMap;
use std::fmt::Write;

pub fn render_verification(report: &VerificationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.package);

    if report.issues.is_empty() {
        let _ = writeln!(out, "  no issues found");
    }
    for issue in &report.issues {
        let _ = writeln!(out, "  {}", issue);
    }

    let status = if report.passed() { "PASSED" } else { "FAILED" };
    let _ = writeln!(
        out,
        "{}: {} error(s), {} warning(s)",
        status,
        report.error_count(),
        report.warning_count()
    );
    out
}

pub fn render_batch(batch: &BatchReport) -> String {
    let mut out = String::new();

    for folder in &batch.folders {
        match &folder.outcome {
            FolderOutcome::Verified(report) => {
                out.push_str(&render_verification(report));
            }
            FolderOutcome::LoadFailed(reason) => {
                let _ = writeln!(
                    out,
                    "{}\n  could not be loaded: {}\nFAILED",
                    folder.name, reason
                );
            }
        }
        out.push('\n');
    }

    if !batch.skipped.is_empty() {
        let _ = writeln!(out, "Skipped (no slot in folder name):");
        for name in &batch.skipped {
            let _ = writeln!(out, "  {}", name);
        }
        out.push('\n');
    }

    if !batch.unreadable.is_empty() {
        let _ = writeln!(out, "Could not be listed:");
        for reason in &batch.unreadable {
            let _ = writeln!(out, "  {}", reason);
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "{} folder(s) checked under {}: {} passed, {} failed, {} skipped",
        batch.folders.len(),
        batch.root,
        batch.passed_count(),
        batch.failed_count(),
        batch.skipped.len()
    );
    out
}

/// Full old → new listing, shown before anything is written.
pub fn render_plan(plan: &RenamePlan) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} -> {} ({} -> {})",
        plan.source_name, plan.target_name, plan.source_slot, plan.target_slot
    );

    for entry in &plan.entries {
        let rule = entry
            .rule
            .as_deref()
            .map(|id| format!(" [{}]", id))
            .unwrap_or_default();
        match &entry.action {
            PlanAction::Rename { to } => {
                let _ = writeln!(out, "  {} -> {}{}", entry.path, to, rule);
            }
            PlanAction::Unchanged => {
                let _ = writeln!(out, "  {} (unchanged){}", entry.path, rule);
            }
            PlanAction::RewriteManifest { rewrites } => {
                let _ = writeln!(
                    out,
                    "  {} ({} path(s) renamed inside)",
                    entry.path,
                    rewrites.len()
                );
            }
            PlanAction::Excluded { reason } => {
                let _ = writeln!(out, "  {} (excluded: {}){}", entry.path, reason, rule);
            }
        }
    }

    if !plan.notes.is_empty() {
        let _ = writeln!(out, "Notes:");
        for note in &plan.notes {
            let _ = writeln!(out, "  {}", note);
        }
    }

    let _ = writeln!(
        out,
        "{} renamed, {} unchanged, {} excluded",
        plan.renamed_count(),
        plan.unchanged_count(),
        plan.excluded_count()
    );
    out
}

pub fn render_staging(report: &StagingReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Created {} ({} of {} outputs, {} excluded, {} manifest edit(s))",
        report.destination, report.staged, report.planned, report.excluded, report.manifest_edits
    );
    out
}

#[derive(Default)]
struct Node {
    is_dir: bool,
    children: BTreeMap<String, Node>,
}

/// Directory tree of a package.
///
/// Directories come first in name order, then files ordered by extension
/// and name.
pub fn render_tree(root_name: &str, entries: &[PackageEntry]) -> String {
    let mut root = Node {
        is_dir: true,
        ..Node::default()
    };

    for entry in entries {
        let mut node = &mut root;
        let mut components = entry.path.split('/').peekable();
        while let Some(component) = components.next() {
            node = node.children.entry(component.to_string()).or_default();
            if components.peek().is_some() || entry.kind == EntryKind::Dir {
                node.is_dir = true;
            }
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", root_name);
    render_children(&root, "", &mut out);
    out
}

fn render_children(node: &Node, prefix: &str, out: &mut String) {
    let mut children: Vec<(&String, &Node)> = node.children.iter().collect();
    children.sort_by(|(a_name, a), (b_name, b)| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| {
                if a.is_dir {
                    a_name.cmp(b_name)
                } else {
                    extension(a_name)
                        .cmp(extension(b_name))
                        .then_with(|| a_name.cmp(b_name))
                }
            })
    });

    let count = children.len();
    for (i, (name, child)) in children.into_iter().enumerate() {
        let last = i + 1 == count;
        let connector = if last { "L__ " } else { "|-- " };
        let _ = writeln!(out, "{}{}{}", prefix, connector, name);

        if child.is_dir {
            let extension = if last { "    " } else { "|   " };
            render_children(child, &format!("{}{}", prefix, extension), out);
        }
    }
}

fn extension(name: &str) -> &str {
    name.rsplit_once('.').map_or("", |(_, ext)| ext)
}
