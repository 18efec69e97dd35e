use std::sync::Arc;

use zarrs_core::{
    array::{ArrayBuilder, ChunkKeySeparator},
    hierarchy::Hierarchy,
    indexer::{ArraySelection, SliceSelection},
    metadata::GroupMetadata,
    node::NodeKind,
    storage::store::FilesystemStore,
};

#[test]
#[cfg_attr(miri, ignore)]
fn filesystem_hierarchy() -> Result<(), Box<dyn std::error::Error>> {
    let path = tempfile::TempDir::new()?;
    let store = Arc::new(FilesystemStore::new(path.path())?);
    let hierarchy = Hierarchy::create(store.clone())?;
    hierarchy.create_group("/group", GroupMetadata::default())?;
    let mut builder = ArrayBuilder::new(vec![6, 4], "<u4", vec![4, 4], 7u32.into());
    builder.separator(ChunkKeySeparator::Dot);
    let array = hierarchy.create_array("/group/sub/array", builder.build_metadata())?;

    array.store_selection_elements::<u32>(
        &ArraySelection::new(vec![SliceSelection::range(3, 5).into()]),
        &[1, 2, 3, 4, 5, 6, 7, 8],
    )?;

    assert!(path.path().join("zarr.json").is_file());
    assert!(path
        .path()
        .join("meta/root/group/sub/array.array.json")
        .is_file());
    assert!(path.path().join("meta/root/group.group.json").is_file());
    assert!(path.path().join("data/root/group/sub/array/c0.0").is_file());
    assert!(path.path().join("data/root/group/sub/array/c1.0").is_file());

    // Reopen from a new store over the same directory
    let hierarchy = Hierarchy::open(Arc::new(FilesystemStore::new(path.path())?))?;
    assert_eq!(
        hierarchy.get_children("/group")?.into_iter().collect::<Vec<_>>(),
        vec![("sub".to_string(), NodeKind::ImplicitGroup)]
    );
    let array = hierarchy.get_array("/group/sub/array")?;
    assert_eq!(array.separator(), ChunkKeySeparator::Dot);
    assert_eq!(
        array.retrieve_selection_elements::<u32>(&ArraySelection::new(vec![
            SliceSelection::range(2, 6).into()
        ]))?,
        vec![7, 7, 7, 7, 1, 2, 3, 4, 5, 6, 7, 8, 7, 7, 7, 7]
    );

    hierarchy.erase_node("/group/sub")?;
    assert!(!hierarchy.has("/group/sub/array")?);
    assert!(hierarchy.has("/group")?);
    Ok(())
}
