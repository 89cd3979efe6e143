pub mod cat_file;
pub mod hash_object;
pub mod ls_tree;
pub mod rev_parse;
pub mod update_ref;
pub mod write_tree;
