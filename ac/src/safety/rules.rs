//! Built-in command rule tables
//!
//! Both tables are evaluated top to bottom and the first match wins, so the
//! order of entries is part of the policy. Blocking rules are always checked
//! before classification rules, and irreversible rules come before the
//! milder ones so a compound command is judged by its worst part. The Easy
//! exceptions only match a single command with no `;`, `&` or `|`.

use super::ReversibilityTier;

/// A pattern that forbids execution outright
#[derive(Debug, Clone, Copy)]
pub struct BlockRule {
    pub name: &'static str,
    pub pattern: &'static str,
    pub reason: &'static str,
}

/// A pattern that assigns a reversibility judgement to a command
#[derive(Debug, Clone, Copy)]
pub struct ClassifyRule {
    pub name: &'static str,
    pub pattern: &'static str,
    pub tier: ReversibilityTier,
    pub requires_confirmation: bool,
    pub undo_hint: Option<&'static str>,
}

pub const BLOCK_RULES: &[BlockRule] = &[
    BlockRule {
        name: "recursive-delete-root",
        pattern: r"\brm\s+(?:-\S+\s+)*?(?:-[a-zA-Z]*[rR][a-zA-Z]*|--recursive)\s+(?:-\S+\s+)*(?:/|/\*|~/?|~/\*|\$HOME/?|\*)(?:\s|;|&|\||$)",
        reason: "recursive deletion of the filesystem root, the home directory or a bare wildcard",
    },
    BlockRule {
        name: "block-device-write",
        pattern: r">\s*/dev/(?:sd[a-z]|hd[a-z]|vd[a-z]|xvd[a-z]|nvme\d+n\d+|mmcblk\d+|disk\d+)",
        reason: "writing directly to a raw block device",
    },
    BlockRule {
        name: "mkfs-device",
        pattern: r"\bmkfs(?:\.[a-z0-9]+)?\b.*\s/dev/",
        reason: "creating a filesystem on a device",
    },
    BlockRule {
        name: "dd-overwrite",
        pattern: r"\bdd\s+(?:.*\s)?(?:if=\S+\s+(?:.*\s)?of=|of=\S+\s+(?:.*\s)?if=)\S+",
        reason: "low-level copy with explicit input and output files",
    },
    BlockRule {
        name: "fork-bomb",
        pattern: r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:",
        reason: "shell fork bomb",
    },
    BlockRule {
        name: "sql-drop-database",
        pattern: r"(?i)\bdrop\s+database\b",
        reason: "dropping a database",
    },
    BlockRule {
        name: "sql-truncate-table",
        pattern: r"(?i)\btruncate\s+table\b",
        reason: "truncating a table",
    },
    BlockRule {
        name: "sql-delete-all",
        pattern: r#"(?i)\bdelete\s+from\s+[\w."`]+\s*(?:;|'|"|$)"#,
        reason: "DELETE without a WHERE clause",
    },
    BlockRule {
        name: "chmod-root",
        pattern: r"\bch(?:mod|own)\s+(?:-\S+\s+)*\S+\s+/(?:\s|;|&|\||$)",
        reason: "changing permissions or ownership of the filesystem root",
    },
    BlockRule {
        name: "pipe-to-interpreter",
        pattern: r"\b(?:curl|wget)\b[^|]*\|\s*(?:sudo\s+)?(?:(?:ba|z|da|k|fi)?sh|python[0-9.]*|perl|ruby|node)\b",
        reason: "piping a downloaded script into an interpreter",
    },
];

pub const CLASSIFY_RULES: &[ClassifyRule] = &[
    ClassifyRule {
        name: "shred",
        pattern: r"\bshred\b",
        tier: ReversibilityTier::Irreversible,
        requires_confirmation: true,
        undo_hint: None,
    },
    ClassifyRule {
        name: "recursive-delete",
        pattern: r"\brm\s+(?:-\S+\s+)*?(?:-[a-zA-Z]*[rR][a-zA-Z]*|--recursive)\b",
        tier: ReversibilityTier::Irreversible,
        requires_confirmation: true,
        undo_hint: Some("Only recoverable from a backup or filesystem snapshot"),
    },
    ClassifyRule {
        name: "find-delete",
        pattern: r"\bfind\b.*\s(?:-delete\b|-exec\s+rm\b)",
        tier: ReversibilityTier::Irreversible,
        requires_confirmation: true,
        undo_hint: Some("Only recoverable from a backup or filesystem snapshot"),
    },
    ClassifyRule {
        name: "git-clean",
        pattern: r"\bgit\s+clean\s+(?:-\S+\s+)*-[a-zA-Z]*f",
        tier: ReversibilityTier::Irreversible,
        requires_confirmation: true,
        undo_hint: Some("Untracked files removed by git clean are not recoverable through git"),
    },
    ClassifyRule {
        name: "git-reset-hard",
        pattern: r"\bgit\s+reset\s+.*--hard\b",
        tier: ReversibilityTier::Irreversible,
        requires_confirmation: true,
        undo_hint: Some("Committed work can be found with `git reflog`; uncommitted changes are lost"),
    },
    ClassifyRule {
        name: "git-unstage",
        pattern: r"^\s*git\s+restore\s+--staged\b[^;&|]*$",
        tier: ReversibilityTier::Easy,
        requires_confirmation: false,
        undo_hint: Some("Stage the file again with `git add`"),
    },
    ClassifyRule {
        name: "git-discard-changes",
        pattern: r"\bgit\s+(?:restore\b|checkout\s+(?:\S+\s+)?--(?:\s|$))",
        tier: ReversibilityTier::Irreversible,
        requires_confirmation: true,
        undo_hint: Some("Discarded working-tree changes are not recorded anywhere"),
    },
    ClassifyRule {
        name: "sql-drop-table",
        pattern: r"(?i)\bdrop\s+table\b",
        tier: ReversibilityTier::Irreversible,
        requires_confirmation: true,
        undo_hint: Some("Restore the table from a database backup"),
    },
    ClassifyRule {
        name: "terraform-destroy",
        pattern: r"\bterraform\s+destroy\b",
        tier: ReversibilityTier::Irreversible,
        requires_confirmation: true,
        undo_hint: None,
    },
    ClassifyRule {
        name: "kubectl-delete",
        pattern: r"\bkubectl\s+delete\b",
        tier: ReversibilityTier::Irreversible,
        requires_confirmation: true,
        undo_hint: Some("Re-apply the resource manifests; persistent volume data may be gone"),
    },
    ClassifyRule {
        name: "docker-prune",
        pattern: r"\bdocker\s+(?:system|volume|image|container|builder)\s+prune\b",
        tier: ReversibilityTier::Irreversible,
        requires_confirmation: true,
        undo_hint: None,
    },
    ClassifyRule {
        name: "publish-dry-run",
        pattern: r"^[^;&|]*\b(?:(?:npm|yarn|pnpm)\s+publish|cargo\s+publish)\b[^;&|]*\s--dry-run\b[^;&|]*$",
        tier: ReversibilityTier::Easy,
        requires_confirmation: false,
        undo_hint: None,
    },
    ClassifyRule {
        name: "git-force-push",
        pattern: r"\bgit\s+push\b.*\s(?:--force(?:-with-lease)?|-[a-zA-Z]*f[a-zA-Z]*)\b",
        tier: ReversibilityTier::Effort,
        requires_confirmation: true,
        undo_hint: Some(
            "Recover the overwritten commits from `git reflog` on a clone that still has them and force-push them back",
        ),
    },
    ClassifyRule {
        name: "package-publish",
        pattern: r"\b(?:(?:npm|yarn|pnpm|poetry)\s+publish|cargo\s+publish|twine\s+upload|gem\s+push)\b",
        tier: ReversibilityTier::Effort,
        requires_confirmation: true,
        undo_hint: Some("A published version cannot be reused; deprecate or yank it (npm deprecate, cargo yank)"),
    },
    ClassifyRule {
        name: "git-history-rewrite",
        pattern: r"\bgit\s+(?:rebase|commit\s+--amend|filter-branch|branch\s+-D)\b",
        tier: ReversibilityTier::Effort,
        requires_confirmation: true,
        undo_hint: Some("Find the previous commit in `git reflog` and reset back to it"),
    },
    ClassifyRule {
        name: "git-push",
        pattern: r"\bgit\s+push\b",
        tier: ReversibilityTier::Effort,
        requires_confirmation: false,
        undo_hint: Some("Revert the pushed commits with `git revert` and push again"),
    },
    ClassifyRule {
        name: "delete-file",
        pattern: r"\brm\b",
        tier: ReversibilityTier::Effort,
        requires_confirmation: true,
        undo_hint: Some("Restore the file from version control or a backup"),
    },
    ClassifyRule {
        name: "remove-directory",
        pattern: r"\brmdir\b",
        tier: ReversibilityTier::Easy,
        requires_confirmation: false,
        undo_hint: Some("Recreate the directory with `mkdir`"),
    },
    ClassifyRule {
        name: "move",
        pattern: r"\bmv\b",
        tier: ReversibilityTier::Effort,
        requires_confirmation: false,
        undo_hint: Some("Move the file back; an overwritten destination is lost"),
    },
    ClassifyRule {
        name: "permissions",
        pattern: r"\bch(?:mod|own|grp)\b",
        tier: ReversibilityTier::Effort,
        requires_confirmation: false,
        undo_hint: Some("Re-apply the previous mode or owner"),
    },
    ClassifyRule {
        name: "package-install",
        pattern: r"\b(?:npm|yarn|pnpm|pip3?|cargo|apt(?:-get)?|brew|dnf|yum)\s+(?:install|add|uninstall|remove)\b",
        tier: ReversibilityTier::Effort,
        requires_confirmation: false,
        undo_hint: Some("Reverse it with the package manager's matching install or uninstall command"),
    },
    ClassifyRule {
        name: "git-local",
        pattern: r"\bgit\s+(?:add|commit|stash|checkout|switch|branch|tag|merge|cherry-pick)\b",
        tier: ReversibilityTier::Easy,
        requires_confirmation: false,
        undo_hint: Some("Undo with `git reset`, `git restore --staged` or `git reflog`"),
    },
    ClassifyRule {
        name: "create",
        pattern: r"\b(?:mkdir|touch)\b",
        tier: ReversibilityTier::Easy,
        requires_confirmation: false,
        undo_hint: Some("Remove what was created"),
    },
    ClassifyRule {
        name: "copy",
        pattern: r"\bcp\b",
        tier: ReversibilityTier::Easy,
        requires_confirmation: false,
        undo_hint: Some("Delete the copy"),
    },
    ClassifyRule {
        name: "read-only",
        pattern: r"^\s*(?:ls|cat|head|tail|less|grep|rg|find|wc|pwd|echo|which|whoami|date|env|stat|file|tree|du|df|ps|uname|git\s+(?:status|log|diff|show|fetch|remote|blame))\b",
        tier: ReversibilityTier::Easy,
        requires_confirmation: false,
        undo_hint: None,
    },
];
