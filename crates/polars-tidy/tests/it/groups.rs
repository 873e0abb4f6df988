use polars_tidy::backend::{Backend, PolarsBackend, PolarsFrame};
use polars_tidy::prelude::{lit, Node, TidyError, TidyResult, VirtualFrame, WindowOptions};

use super::*;

#[test]
fn test_identity_transform_reproduces_rows() {
    let df = sales();
    let backend = PolarsBackend;
    let frame = PolarsFrame::Eager(df.clone());
    for groups in [
        vec!["year"],
        vec!["region"],
        vec!["region", "year"],
        vec!["total"],
    ] {
        let groups = groups.into_iter().map(String::from).collect::<Vec<_>>();
        let out = backend
            .apply_on_groups(&frame, &groups, |part| Ok(part.clone()))
            .unwrap()
            .into_df()
            .unwrap();
        assert!(out.equals_missing(&df), "groups {groups:?}");

        let out = tidy(df.clone())
            .group_by(&groups.iter().map(String::as_str).collect::<Vec<_>>())
            .unwrap()
            .map_groups(Ok)
            .unwrap()
            .to_df()
            .unwrap();
        assert!(out.equals_missing(&df), "groups {groups:?}");
    }
}

#[test]
fn test_grouped_filter_keeps_row_order() {
    let df = df![
        "k" => ["b", "a", "b"],
        "v" => [1i64, 2, 3],
    ]
    .unwrap();
    let out = tidy(df)
        .group_by(&["k"])
        .unwrap()
        .filter_with(|vf| {
            let v = vf.col("v")?;
            Ok(v.greater_equal(v.mean()))
        })
        .unwrap();
    assert_eq!(out.groups(), ["k"]);

    let expected = df![
        "k" => ["a", "b"],
        "v" => [2i64, 3],
    ]
    .unwrap();
    assert!(out.to_df().unwrap().equals_missing(&expected));
}

#[test]
fn test_summarise_by_year_in_first_occurrence_order() {
    let out = tidy(sales())
        .group_by(&["year"])
        .unwrap()
        .summarise_with(|vf| {
            let total = vf.col("total")?;
            Ok(vec![("total_max", total.max()), ("total_min", total.min())])
        })
        .unwrap();
    assert!(!out.is_grouped());

    let expected = df![
        "year" => [2021i64, 2019, 2020, 2018, 2022],
        "total_max" => [10i64, 9, 12, 8, 1],
        "total_min" => [7i64, 4, 12, 3, 1],
    ]
    .unwrap();
    assert!(out.to_df().unwrap().equals_missing(&expected));
}

#[test]
fn test_grouped_mutate_matches_lazy_windows() {
    let share = |frame: TidyFrame| {
        frame
            .group_by(&["region"])
            .unwrap()
            .mutate_with(|vf| {
                let total = vf.col("total")?;
                Ok(vec![("share", total.divide(total.sum()))])
            })
            .unwrap()
            .to_df()
            .unwrap()
    };
    let eager = share(tidy(sales()));
    let lazy = share(tidy(sales()).lazy());
    assert!(eager.equals_missing(&lazy));

    let share = eager.column("share").unwrap().as_materialized_series();
    let first = share.f64().unwrap().get(1).unwrap();
    assert!((first - 4.0 / 15.0).abs() < 1e-12);
}

#[test]
fn test_grouped_head_keeps_original_order() {
    let out = tidy(sales())
        .group_by(&["region"])
        .unwrap()
        .head(1)
        .unwrap()
        .to_df()
        .unwrap();
    let expected = df![
        "year" => [2021i64, 2019, 2020],
        "region" => ["b", "a", "c"],
        "total" => [10i64, 4, 12],
    ]
    .unwrap();
    assert!(out.equals_missing(&expected));
}

#[test]
fn test_grouped_slice_from_the_end() {
    let out = tidy(sales())
        .group_by(&["region"])
        .unwrap()
        .slice(-1, 1)
        .unwrap()
        .to_df()
        .unwrap();
    let region = out.column("region").unwrap().as_materialized_series();
    let total = out.column("total").unwrap().as_materialized_series();
    let (region, total) = (region.str().unwrap(), total.i64().unwrap());
    assert_eq!(region.into_no_null_iter().collect::<Vec<_>>(), ["b", "c", "a"]);
    assert_eq!(total.into_no_null_iter().collect::<Vec<_>>(), [9, 1, 8]);
}

#[test]
fn test_collapsed_groups_follow_first_occurrence() {
    let out = tidy(sales())
        .group_by(&["region"])
        .unwrap()
        .map_groups(|part| {
            part.summarise_with(|vf| Ok(vec![("first_year", vf.col("year")?.first())]))
        })
        .unwrap()
        .to_df()
        .unwrap();
    let expected = df!["first_year" => [2021i64, 2019, 2020]].unwrap();
    assert!(out.equals_missing(&expected));
}

#[test]
fn test_grouped_arrange_sorts_groups_first() {
    let out = tidy(sales())
        .group_by(&["region"])
        .unwrap()
        .arrange_with(|vf| Ok(vec![("desc", vf.col("total")?)]))
        .unwrap()
        .to_df()
        .unwrap();
    let total = out.column("total").unwrap().as_materialized_series();
    let total = total.i64().unwrap();
    assert_eq!(
        total.into_no_null_iter().collect::<Vec<_>>(),
        [8, 4, 3, 10, 9, 7, 12, 1]
    );
}

#[test]
fn test_lazy_groups_reject_aggregating_filters() {
    let grouped = tidy(sales()).lazy().group_by(&["region"]).unwrap();
    let err = grouped
        .filter_with(|vf| {
            let total = vf.col("total")?;
            Ok(total.greater(total.mean()))
        })
        .unwrap_err();
    assert!(matches!(err, TidyError::NotSupportedForLazyGroups(_)));

    let err = grouped.head(1).unwrap_err();
    assert!(matches!(err, TidyError::NotSupportedForLazyGroups(_)));

    let out = grouped
        .filter_with(|vf| Ok(vf.col("total")?.greater(5)))
        .unwrap()
        .collect()
        .unwrap();
    assert_eq!(out.n_rows().unwrap(), 5);
    assert_eq!(out.groups(), ["region"]);
}

#[test]
fn test_lazy_grouped_filter_matches_eager() {
    let predicates: [fn(&VirtualFrame) -> TidyResult<Node>; 3] = [
        |vf| {
            let total = vf.col("total")?;
            Ok(total.greater(total.shift(1)))
        },
        |vf| Ok(vf.col("total")?.cumulative_sum(false).less(15)),
        |vf| Ok(vf.col("total")?.window_mean(WindowOptions::new(2)).greater(6)),
    ];
    for predicate in predicates {
        let eager = tidy(sales())
            .group_by(&["region"])
            .unwrap()
            .filter_with(predicate)
            .unwrap()
            .to_df()
            .unwrap();
        let lazy = tidy(sales())
            .lazy()
            .group_by(&["region"])
            .unwrap()
            .filter_with(predicate)
            .unwrap()
            .to_df()
            .unwrap();
        assert!(lazy.equals_missing(&eager), "{lazy:?}\n{eager:?}");
    }

    let out = tidy(sales())
        .lazy()
        .group_by(&["region"])
        .unwrap()
        .filter_with(predicates[0])
        .unwrap()
        .to_df()
        .unwrap();
    let expected = df![
        "year" => [2019i64, 2018],
        "region" => ["b", "a"],
        "total" => [9i64, 8],
    ]
    .unwrap();
    assert!(out.equals_missing(&expected));
}

#[test]
fn test_lazy_grouped_mutate_with_constant() {
    let out = tidy(sales())
        .lazy()
        .group_by(&["region"])
        .unwrap()
        .mutate_with(|vf| {
            Ok(vec![
                ("one", lit(1)),
                ("running", vf.col("total")?.cumulative_sum(false)),
            ])
        })
        .unwrap()
        .to_df()
        .unwrap();
    let running = out.column("running").unwrap().as_materialized_series();
    let running = running.i64().unwrap();
    assert_eq!(
        running.into_no_null_iter().collect::<Vec<_>>(),
        [10, 4, 17, 12, 7, 26, 13, 15]
    );
}

#[test]
fn test_diverging_group_schemas_fail_in_concat() {
    let mut calls = 0;
    let err = tidy(sales())
        .group_by(&["region"])
        .unwrap()
        .map_groups(|part| {
            calls += 1;
            if calls == 1 {
                part.mutate_with(|vf| Ok(vec![("extra", vf.col("total")? * 2)]))
            } else {
                Ok(part)
            }
        })
        .unwrap_err();
    assert!(matches!(err, TidyError::Engine(_)), "{err}");
}

#[test]
fn test_duplicate_groups_are_rejected() {
    let err = tidy(sales()).group_by(&["region", "region"]).unwrap_err();
    assert!(matches!(err, TidyError::InvalidOperation(_)));
}
