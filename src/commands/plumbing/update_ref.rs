use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::reference::reference::Reference;

impl Repository {
    /// Create or update a ref to point at the given object.
    pub fn update_ref(&self, ref_path: &str, sha: &str) -> anyhow::Result<()> {
        let reference = Self::parse_ref_path(ref_path)?;
        let oid = ObjectId::try_parse(sha.to_string())?;

        self.refs().create_or_update(&reference, &oid)
    }

    /// Delete a ref.
    pub fn delete_ref(&self, ref_path: &str) -> anyhow::Result<()> {
        let reference = Self::parse_ref_path(ref_path)?;
        self.refs().delete(&reference)
    }

    fn parse_ref_path(ref_path: &str) -> anyhow::Result<Reference> {
        Reference::try_from_path(ref_path)
            .or_else(|| {
                // bare names are taken as local branches
                Reference::is_valid_name(ref_path).then(|| Reference::local(ref_path))
            })
            .ok_or_else(|| anyhow::anyhow!("invalid ref path '{}'", ref_path))
    }
}
