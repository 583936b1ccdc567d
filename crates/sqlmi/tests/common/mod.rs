use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const NOT_FOUND: &str = "ERROR: (ResourceNotFound) The Resource 'Microsoft.Sql/managedInstances/sqlmi1' under resource group 'rg1' was not found.\nCode: ResourceNotFound";

pub const INSTANCE_JSON: &str = r#"{
  "id": "/subscriptions/0000/resourceGroups/rg1/providers/Microsoft.Sql/managedInstances/sqlmi1",
  "name": "sqlmi1",
  "resourceGroup": "rg1",
  "location": "japaneast",
  "state": "Ready",
  "vCores": 4,
  "storageSizeInGb": 32,
  "licenseType": "LicenseIncluded",
  "sku": {"name": "GP_Gen5", "tier": "GeneralPurpose", "family": "Gen5", "capacity": 4}
}"#;

/// 一時ディレクトリに設定ファイルと偽の az を置くテスト環境
pub struct TestEnv {
    pub root: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let env = Self { root };
        env.write_config("");
        env
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.path().join("sqlmi.yaml")
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).unwrap();
    }

    /// `az sql mi create` が呼ばれたときに作られるマーカー
    #[allow(dead_code)]
    pub fn create_marker(&self) -> PathBuf {
        self.root.path().join("create-called")
    }

    /// `show` と `create` の応答を指定した偽の az を書き出す
    ///
    /// `show` が `None` なら ResourceNotFound で失敗する。
    #[cfg(unix)]
    #[allow(dead_code)]
    pub fn write_fake_az(&self, show: Option<&str>, create: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let show_branch = match show {
            Some(json) => format!("cat <<'EOF'\n{}\nEOF\nexit 0", json),
            None => format!("cat >&2 <<'EOF'\n{}\nEOF\nexit 3", NOT_FOUND),
        };
        let script = format!(
            "#!/bin/sh\ncase \"$3\" in\nshow)\n{}\n;;\ncreate)\necho \"$@\" > '{}'\ncat <<'EOF'\n{}\nEOF\nexit 0\n;;\nesac\necho \"unexpected: $@\" >&2\nexit 2\n",
            show_branch,
            self.create_marker().display(),
            create
        );

        let path = self.root.path().join("az");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}
