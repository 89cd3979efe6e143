use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::ObjectError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Loose object database
///
/// Stores zlib-compressed objects under `objects/<2-hex>/<38-hex>`, addressed
/// by their content hash. Writes are idempotent: storing content that is
/// already present is a no-op.
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).exists()
    }

    /// Decompressed full bytes (`<type> <len>\0<body>`) of a stored object.
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        if !object_path.exists() {
            return Err(ObjectError::NotFound(object_id.clone()).into());
        }

        self.read_object(object_path)
    }

    /// Store an object, creating its shard directory on first use.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        // write the object to disk unless it already exists
        if !object_path.exists() {
            std::fs::create_dir_all(
                object_path
                    .parent()
                    .context(format!("Invalid object path {}", object_path.display()))?,
            )
            .context(format!(
                "Unable to create object directory {}",
                object_path.display()
            ))?;

            self.write_object(object_path, object.serialize()?)?;
        }

        Ok(object_id)
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(object_reader)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(object_reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(
                object_reader,
            )?))),
        }
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Option<Blob>> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(Some(Blob::deserialize(object_reader)?)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> anyhow::Result<Option<Tree>> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Tree => Ok(Some(Tree::deserialize(object_reader)?)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<Commit>> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Commit => Ok(Some(Commit::deserialize(object_reader)?)),
            _ => Ok(None),
        }
    }

    /// Object type without materializing the body.
    pub fn get_object_type(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        let (object_type, _) = self.parse_object_as_bytes(object_id)?;
        Ok(object_type)
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let object_content = self.load(object_id)?;
        let mut object_reader = Cursor::new(object_content);

        // the declared length is not checked against the body; consumers
        // read to EOF
        let (object_type, _declared_len) = ObjectType::parse_header(&mut object_reader)?;

        Ok((object_type, object_reader))
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// Find all objects whose OID starts with the given prefix.
    ///
    /// Used to resolve abbreviated OIDs to their full form. Multiple matches
    /// indicate an ambiguous prefix; the caller decides how to report them.
    ///
    /// Prefixes of 2+ characters only scan the matching shard directory;
    /// shorter prefixes must scan all of them.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let mut matches = Vec::new();

        if prefix.len() >= 2 {
            let dir_name = &prefix[..2];
            let file_prefix = &prefix[2..];
            let dir_path = self.path.join(dir_name);

            if dir_path.is_dir() {
                for entry in std::fs::read_dir(&dir_path)? {
                    let entry = entry?;
                    let file_name = entry.file_name();
                    let file_name_str = file_name.to_string_lossy();

                    if file_name_str.starts_with(file_prefix) {
                        let full_oid = format!("{}{}", dir_name, file_name_str);
                        if let Ok(oid) = ObjectId::try_parse(full_oid) {
                            matches.push(oid);
                        }
                    }
                }
            }
        } else {
            for i in 0..=255 {
                let dir_name = format!("{:02x}", i);
                let dir_path = self.path.join(&dir_name);

                if dir_path.is_dir() {
                    for entry in std::fs::read_dir(&dir_path)? {
                        let entry = entry?;
                        let file_name = entry.file_name();
                        let file_name_str = file_name.to_string_lossy();
                        let full_oid = format!("{}{}", dir_name, file_name_str);

                        if full_oid.starts_with(prefix) {
                            let oid = ObjectId::try_parse(full_oid)?;
                            matches.push(oid);
                        }
                    }
                }
            }
        }

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::FileMode;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn database() -> (assert_fs::TempDir, Database) {
        let dir = assert_fs::TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        (dir, database)
    }

    fn hello_blob() -> Blob {
        Blob::new(
            Bytes::from_static(b"Hello, World!\n"),
            FileMode::Regular,
        )
    }

    #[rstest]
    fn test_store_and_load_round_trip(database: (assert_fs::TempDir, Database)) {
        let (_dir, database) = database;
        let blob = hello_blob();

        let oid = database.store(&blob).unwrap();
        assert_eq!(oid.as_ref(), "8ab686eafeb1f44702738c8b0f24f2567c36da6d");
        assert!(database.exists(&oid));

        let loaded = database.parse_object_as_blob(&oid).unwrap().unwrap();
        assert_eq!(loaded.content(), blob.content());
    }

    #[rstest]
    fn test_store_is_idempotent(database: (assert_fs::TempDir, Database)) {
        let (_dir, database) = database;
        let blob = hello_blob();

        let first = database.store(&blob).unwrap();
        let object_path = database.objects_path().join(first.to_path());
        let mtime_before = std::fs::metadata(&object_path).unwrap().modified().unwrap();
        let bytes_before = std::fs::read(&object_path).unwrap();

        let second = database.store(&blob).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            std::fs::metadata(&object_path).unwrap().modified().unwrap(),
            mtime_before
        );
        assert_eq!(std::fs::read(&object_path).unwrap(), bytes_before);
    }

    #[rstest]
    fn test_load_missing_object_is_not_found(database: (assert_fs::TempDir, Database)) {
        let (_dir, database) = database;
        let absent = ObjectId::try_parse("a".repeat(40)).unwrap();

        assert!(!database.exists(&absent));
        let err = database.load(&absent).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ObjectError>(),
            Some(ObjectError::NotFound(oid)) if *oid == absent
        ));
    }

    #[rstest]
    fn test_stored_bytes_are_zlib_of_encoded_object(database: (assert_fs::TempDir, Database)) {
        let (_dir, database) = database;
        let blob = hello_blob();
        let oid = database.store(&blob).unwrap();

        let on_disk = std::fs::read(database.objects_path().join(oid.to_path())).unwrap();
        let decompressed = Database::decompress(on_disk.into()).unwrap();
        assert_eq!(&decompressed[..], b"blob 14\0Hello, World!\n");
    }

    #[rstest]
    fn test_find_objects_by_prefix(database: (assert_fs::TempDir, Database)) {
        let (_dir, database) = database;
        let oid = database.store(&hello_blob()).unwrap();

        let matches = database.find_objects_by_prefix("8ab686e").unwrap();
        assert_eq!(matches, vec![oid.clone()]);

        let matches = database.find_objects_by_prefix("8").unwrap();
        assert_eq!(matches, vec![oid]);

        assert!(database.find_objects_by_prefix("beef").unwrap().is_empty());
    }
}
