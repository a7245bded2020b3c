use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// 限定在 workspace 目录内的文件操作
pub struct FsTools {
    workspace_root: PathBuf,
}

impl FsTools {
    pub fn new(workspace_root: PathBuf) -> Self {
        FsTools { workspace_root }
    }

    /// 解析路径，确保在 workspace 内。绝对路径和 `..` 直接拒绝；
    /// 已存在的部分做 canonicalize，防止符号链接指向 workspace 外
    fn resolve_path(&self, path: &str) -> Result<PathBuf> {
        let mut full = self.workspace_root.clone();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => full.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(anyhow!("path escapes the workspace: {}", path));
                }
            }
        }

        let root = self.workspace_root.canonicalize().with_context(|| {
            format!("workspace not found: {}", self.workspace_root.display())
        })?;

        // 最深的已存在祖先（悬空的符号链接也算存在）
        let mut existing = full.as_path();
        while fs::symlink_metadata(existing).is_err() {
            existing = match existing.parent() {
                Some(parent) => parent,
                None => break,
            };
        }
        let resolved = existing
            .canonicalize()
            .with_context(|| format!("failed to resolve path: {}", path))?;
        if !resolved.starts_with(&root) {
            return Err(anyhow!("path escapes the workspace: {}", path));
        }

        Ok(full)
    }

    pub fn read(&self, path: &str) -> Result<String> {
        let full_path = self.resolve_path(path)?;
        fs::read_to_string(&full_path).with_context(|| format!("failed to read file: {}", path))
    }

    pub fn write(&self, path: &str, content: &str) -> Result<String> {
        let full_path = self.resolve_path(path)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory for: {}", path))?;
        }

        fs::write(&full_path, content).with_context(|| format!("failed to write file: {}", path))?;
        Ok(format!("File written: {}", path))
    }

    pub fn patch(&self, path: &str, old_string: &str, new_string: &str) -> Result<String> {
        let full_path = self.resolve_path(path)?;

        let content = fs::read_to_string(&full_path)
            .with_context(|| format!("failed to read file: {}", path))?;

        let match_count = content.matches(old_string).count();

        if match_count == 0 {
            return Err(anyhow!("text to replace not found: {}", old_string));
        }

        if match_count > 1 {
            return Err(anyhow!(
                "text occurs {} times, replacement is ambiguous: {}",
                match_count,
                old_string
            ));
        }

        let new_content = content.replacen(old_string, new_string, 1);

        fs::write(&full_path, &new_content)
            .with_context(|| format!("failed to write file: {}", path))?;

        Ok(format!("File updated: {}", path))
    }

    /// 目录条目，已排序，目录名带 `/` 后缀
    pub fn list(&self, path: &str) -> Result<Vec<String>> {
        let full_path = self.resolve_path(path)?;

        if !full_path.exists() {
            return Err(anyhow!("directory does not exist: {}", path));
        }

        if !full_path.is_dir() {
            return Err(anyhow!("not a directory: {}", path));
        }

        let entries = fs::read_dir(&full_path)
            .with_context(|| format!("failed to read directory: {}", path))?;

        let mut items = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.path().is_dir() {
                items.push(format!("{}/", name));
            } else {
                items.push(name);
            }
        }

        items.sort();
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools() -> (tempfile::TempDir, FsTools) {
        let dir = tempfile::tempdir().unwrap();
        let tools = FsTools::new(dir.path().to_path_buf());
        (dir, tools)
    }

    #[test]
    fn write_then_read_inside_workspace() {
        let (_dir, tools) = tools();
        tools.write("notes/today.md", "hello").unwrap();
        assert_eq!(tools.read("./notes/today.md").unwrap(), "hello");
    }

    #[test]
    fn rejects_parent_escape() {
        let (_dir, tools) = tools();
        let err = tools.read("../etc/passwd").unwrap_err();
        assert!(err.to_string().contains("escapes the workspace"));
    }

    #[test]
    fn rejects_absolute_paths() {
        let (_dir, tools) = tools();
        tools.write("notes/today.md", "hello").unwrap();

        let err = tools.read("/notes/today.md").unwrap_err();
        assert!(err.to_string().contains("escapes the workspace"));
        assert!(tools.write("/tmp/owned.txt", "x").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn rejects_symlink_out_of_workspace() {
        let (dir, tools) = tools();
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "secret").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let err = tools.read("link/secret.txt").unwrap_err();
        assert!(err.to_string().contains("escapes the workspace"));
        assert!(tools.write("link/new.txt", "x").is_err());
        assert!(!outside.path().join("new.txt").exists());
    }

    #[test]
    fn patch_requires_single_match() {
        let (_dir, tools) = tools();
        tools.write("a.txt", "one two two").unwrap();

        assert!(tools.patch("a.txt", "three", "x").is_err());
        assert!(tools.patch("a.txt", "two", "x").is_err());

        tools.patch("a.txt", "one", "zero").unwrap();
        assert_eq!(tools.read("a.txt").unwrap(), "zero two two");
    }

    #[test]
    fn list_marks_directories() {
        let (_dir, tools) = tools();
        tools.write("b.txt", "").unwrap();
        tools.write("sub/c.txt", "").unwrap();

        assert_eq!(tools.list(".").unwrap(), vec!["b.txt", "sub/"]);
        assert!(tools.list("b.txt").is_err());
        assert!(tools.list("nope").is_err());
    }
}
