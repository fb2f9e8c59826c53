use std::{fs, io, path::PathBuf};

use uuid::Uuid;

/// Location of one rendered report, `{contract_id}/{week_number}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportKey {
    pub contract_id: Uuid,
    pub week_number: i32,
}

impl ReportKey {
    pub fn path(&self) -> String {
        format!("{}/{}", self.contract_id, self.week_number)
    }
}

/// Where rendered reports end up
///
/// Writing an existing key replaces the previous document.
pub trait ReportStore: Send + Sync + 'static {
    /// Stores the document and returns the URL it can be fetched from
    fn put(&self, key: ReportKey, document: &[u8]) -> io::Result<String>;

    fn get(&self, key: ReportKey) -> io::Result<Vec<u8>>;
}

pub struct FsReportStore {
    root: PathBuf,
    base_url: String,
}

impl FsReportStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    fn file(&self, key: ReportKey) -> PathBuf {
        self.root
            .join(key.contract_id.to_string())
            .join(format!("{}.pdf", key.week_number))
    }
}

impl ReportStore for FsReportStore {
    fn put(&self, key: ReportKey, document: &[u8]) -> io::Result<String> {
        let file = self.file(key);
        let dir = file.parent().ok_or_else(|| io::Error::other("report path has no parent"))?;
        fs::create_dir_all(dir)?;

        // Readers never observe a half written file
        let staging = dir.join(format!(".{}.{}.tmp", key.week_number, Uuid::new_v4()));
        fs::write(&staging, document)?;
        if let Err(err) = fs::rename(&staging, &file) {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }

        Ok(format!("{}/{}", self.base_url, key.path()))
    }

    fn get(&self, key: ReportKey) -> io::Result<Vec<u8>> {
        fs::read(self.file(key))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::env;

    use super::*;

    pub(crate) fn temp_store() -> (FsReportStore, PathBuf) {
        let root = env::temp_dir().join(format!("contract-ledger-{}", Uuid::new_v4()));

        (FsReportStore::new(&root, "/reports"), root)
    }

    #[test]
    fn test_put_overwrites_same_key() {
        let (store, root) = temp_store();
        let key = ReportKey { contract_id: Uuid::new_v4(), week_number: 2 };

        let url = store.put(key, b"first").unwrap();
        assert_eq!(url, format!("/reports/{}/2", key.contract_id));

        let again = store.put(key, b"second").unwrap();
        assert_eq!(url, again);
        assert_eq!(store.get(key).unwrap(), b"second");

        let entries = fs::read_dir(root.join(key.contract_id.to_string())).unwrap().count();
        assert_eq!(entries, 1, "staging files must not be left behind");

        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_missing_report() {
        let (store, _) = temp_store();

        let err = store.get(ReportKey { contract_id: Uuid::new_v4(), week_number: 1 }).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
