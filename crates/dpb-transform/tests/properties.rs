//! Property tests for row and column operations.

use polars::prelude::*;
use proptest::prelude::*;

use dpb_transform::{drop_columns, drop_duplicates, sort_rows};

fn table(keys: &[i32], tags: &[String]) -> DataFrame {
    let order: Vec<i32> = (0..keys.len() as i32).collect();
    df! {
        "key" => keys.to_vec(),
        "tag" => tags.to_vec(),
        "order" => order,
    }
    .unwrap()
}

fn i32s(df: &DataFrame, column: &str) -> Vec<i32> {
    df.column(column)
        .unwrap()
        .i32()
        .unwrap()
        .into_iter()
        .flatten()
        .collect()
}

fn rows() -> impl Strategy<Value = (Vec<i32>, Vec<String>)> {
    (1usize..40).prop_flat_map(|len| {
        (
            prop::collection::vec(0i32..5, len),
            prop::collection::vec("[a-c]", len),
        )
    })
}

proptest! {
    #[test]
    fn sort_is_stable((keys, tags) in rows(), ascending in any::<bool>()) {
        let df = table(&keys, &tags);
        let sorted = sort_rows(&df, &["key".to_string()], &[ascending]).unwrap();
        let keys = i32s(&sorted, "key");
        let order = i32s(&sorted, "order");
        for idx in 1..keys.len() {
            if keys[idx - 1] == keys[idx] {
                prop_assert!(order[idx - 1] < order[idx]);
            } else if ascending {
                prop_assert!(keys[idx - 1] < keys[idx]);
            } else {
                prop_assert!(keys[idx - 1] > keys[idx]);
            }
        }
    }

    #[test]
    fn drop_duplicates_is_idempotent((keys, tags) in rows()) {
        let df = table(&keys, &tags);
        let subset = vec!["key".to_string(), "tag".to_string()];
        let once = drop_duplicates(&df, Some(&subset), "first").unwrap();
        let twice = drop_duplicates(&once, Some(&subset), "first").unwrap();
        prop_assert!(once.equals(&twice));
    }

    #[test]
    fn drop_columns_removes_exactly_the_named_set(
        (keys, tags) in rows(),
        drop_key in any::<bool>(),
        drop_tag in any::<bool>(),
    ) {
        let df = table(&keys, &tags);
        let mut dropped = Vec::new();
        if drop_key {
            dropped.push("key".to_string());
        }
        if drop_tag {
            dropped.push("tag".to_string());
        }
        let out = drop_columns(&df, &dropped).unwrap();
        for name in ["key", "tag", "order"] {
            let expect_present = !dropped.iter().any(|d| d == name);
            prop_assert_eq!(out.column(name).is_ok(), expect_present);
            if expect_present {
                let kept = out.column(name).unwrap().as_materialized_series();
                let source = df.column(name).unwrap().as_materialized_series();
                prop_assert!(kept.equals(source));
            }
        }
    }
}
