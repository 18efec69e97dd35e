use std::sync::Arc;

use zarrs_core::{
    array::{Array, ArrayBuilder, ArrayError, ArrayOptions, ArrayValue, ChunkKeySeparator},
    hierarchy::Hierarchy,
    indexer::{ArraySelection, DimensionSelection, SliceSelection},
    storage::{store::MemoryStore, ReadableStorageTraits},
};

#[test]
fn array_sync_write_index_read_full() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let hierarchy = Hierarchy::create(store.clone())?;
    let array = hierarchy.create_array(
        "/array",
        ArrayBuilder::new(vec![10], "u1", vec![3], 0u8.into()).build_metadata(),
    )?;

    array.store_selection_broadcast(&ArraySelection::new(vec![DimensionSelection::Index(7)]), 5u8)?;
    assert_eq!(
        array.retrieve_selection_elements::<u8>(&ArraySelection::full())?,
        vec![0, 0, 0, 0, 0, 0, 0, 5, 0, 0]
    );

    // Only the chunk holding index 7 was written
    assert!(store.get(&array.chunk_key(&[2]))?.is_some());
    for chunk in [[0], [1], [3]] {
        assert!(store.get(&array.chunk_key(&chunk))?.is_none());
    }
    Ok(())
}

#[rustfmt::skip]
#[test]
fn array_sync_selection_2d() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = ArrayBuilder::new(vec![4, 4], "u1", vec![2, 2], 0u8.into())
        .build(store.clone(), "/array")?;

    //  0  1 |  2  3
    //  4  5 |  6  7
    // ------|------
    //  8  9 | 10 11
    // 12 13 | 14 15
    let elements: Vec<u8> = (0..16).collect();
    array.store_selection(&ArraySelection::full(), &elements)?;

    let selection = ArraySelection::new(vec![
        SliceSelection::range(1, 3).into(),
        DimensionSelection::Index(2),
    ]);
    assert_eq!(
        array.retrieve_selection_value::<u8>(&selection)?,
        ArrayValue::Array { shape: vec![2], elements: vec![6, 10] }
    );
    assert_eq!(
        array.retrieve_selection_value::<u8>(&ArraySelection::new(vec![
            DimensionSelection::Index(-1),
            DimensionSelection::Index(-1),
        ]))?,
        ArrayValue::Scalar(15)
    );
    assert_eq!(
        array.retrieve_selection_elements::<u8>(&ArraySelection::new(vec![
            SliceSelection::new(None, None, Some(2)).into(),
            SliceSelection::new(Some(-3), None, Some(2)).into(),
        ]))?,
        vec![1, 3, 9, 11]
    );
    assert_eq!(
        array.retrieve_selection_elements::<u8>(&ArraySelection::new(vec![DimensionSelection::Index(3)]))?,
        vec![12, 13, 14, 15]
    );
    assert_eq!(
        array.retrieve_chunk_elements::<u8>(&[1, 0])?,
        vec![8, 9, 12, 13]
    );

    assert!(matches!(
        array.retrieve_selection(&ArraySelection::new(vec![DimensionSelection::Index(4)])),
        Err(ArrayError::IndexerError(_))
    ));
    assert!(matches!(
        array.retrieve_selection(&ArraySelection::new(vec![DimensionSelection::Full; 3])),
        Err(ArrayError::IndexerError(_))
    ));
    assert!(matches!(
        array.retrieve_selection(&ArraySelection::new(vec![
            SliceSelection::new(None, None, Some(-1)).into()
        ])),
        Err(ArrayError::IndexerError(_))
    ));
    Ok(())
}

#[test]
fn array_sync_edge_chunks() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = ArrayBuilder::new(vec![5, 3], "<i4", vec![2, 2], (-1i32).into())
        .build(store, "/array")?;
    let elements: Vec<i32> = (0..15).collect();
    array.store_selection_elements(&ArraySelection::full(), &elements)?;
    assert_eq!(
        array.retrieve_selection_elements::<i32>(&ArraySelection::full())?,
        elements
    );

    // Edge chunks are stored at the full chunk shape, padded with the fill value
    assert_eq!(array.retrieve_chunk_elements::<i32>(&[2, 1])?, vec![14, -1, -1, -1]);
    assert_eq!(array.chunk_grid_shape(), vec![3, 2]);
    Ok(())
}

fn array_sync_round_trip(array: &Array<MemoryStore>) -> Result<(), Box<dyn std::error::Error>> {
    let elements: Vec<f64> = (0..64 * 64).map(|i| f64::from(i) * 0.5).collect();
    array.store_selection_elements(&ArraySelection::full(), &elements)?;
    assert_eq!(
        array.retrieve_selection_elements::<f64>(&ArraySelection::full())?,
        elements
    );

    let selection = ArraySelection::new(vec![
        SliceSelection::new(Some(3), Some(60), Some(7)).into(),
        DimensionSelection::Index(-2),
    ]);
    let expected: Vec<f64> = (3..60)
        .step_by(7)
        .map(|row| elements[row * 64 + 62])
        .collect();
    assert_eq!(array.retrieve_selection_elements::<f64>(&selection)?, expected);
    Ok(())
}

#[test]
fn array_sync_byte_order_and_compressors() -> Result<(), Box<dyn std::error::Error>> {
    let mut compressors: Vec<Option<serde_json::Value>> = vec![None];
    if cfg!(feature = "gzip") {
        compressors.push(Some(serde_json::json!({"codec": "gzip", "configuration": {"level": 1}})));
    }
    if cfg!(feature = "zstd") {
        compressors.push(Some(
            serde_json::json!({"codec": "zstd", "configuration": {"level": 3, "checksum": true}}),
        ));
    }

    for data_type in ["<f8", ">f8"] {
        for compressor in &compressors {
            let store = Arc::new(MemoryStore::new());
            let mut metadata =
                ArrayBuilder::new(vec![64, 64], data_type, vec![16, 20], 0.0f64.into())
                    .build_metadata();
            metadata.compressor = compressor
                .as_ref()
                .map(|compressor| serde_json::from_value(compressor.clone()))
                .transpose()?;
            let hierarchy = Hierarchy::create(store)?;
            let array = hierarchy.create_array("/array", metadata)?;
            array_sync_round_trip(&array)?;
        }
    }
    Ok(())
}

#[test]
fn array_sync_concurrency() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = ArrayBuilder::new(vec![100], "<u8", vec![7], 0u64.into())
        .separator(ChunkKeySeparator::Dot)
        .build(store, "/array")?;
    let elements: Vec<u64> = (0..100).collect();
    for concurrent_target in [0, 1, 3] {
        let options = ArrayOptions::builder()
            .concurrent_target(concurrent_target)
            .build();
        array.erase_chunk(&[0])?;
        array.store_selection_elements_opt(&ArraySelection::full(), &elements, &options)?;
        assert_eq!(
            array.retrieve_selection_elements_opt::<u64>(&ArraySelection::full(), &options)?,
            elements
        );
    }
    Ok(())
}

#[cfg(feature = "ndarray")]
#[test]
fn array_sync_ndarray() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let array = ArrayBuilder::new(vec![4, 4, 4], "<i2", vec![3, 3, 3], 0i16.into())
        .build(store, "/array")?;
    let input = ndarray::Array3::<i16>::from_shape_fn((2, 4, 3), |(i, j, k)| {
        i16::try_from(i * 100 + j * 10 + k).unwrap()
    })
    .into_dyn();
    let selection = ArraySelection::new(vec![
        SliceSelection::range(1, 3).into(),
        DimensionSelection::Full,
        SliceSelection::range(1, 4).into(),
    ]);
    array.store_selection_ndarray(&selection, input.view())?;
    assert_eq!(array.retrieve_selection_ndarray::<i16>(&selection)?, input);
    assert_eq!(
        array.retrieve_selection_ndarray::<i16>(&ArraySelection::new(vec![
            DimensionSelection::Index(2),
            DimensionSelection::Index(3),
        ]))?,
        ndarray::array![0, 130, 131, 132].into_dyn()
    );
    Ok(())
}
