use polars_tidy::prelude::{Dtype, JoinHow, TidyError};

use super::*;

#[test]
fn test_lazy_verbs_match_eager() {
    let run = |frame: TidyFrame| {
        frame
            .filter_with(|vf| Ok(vf.col("total")?.greater(2)))
            .unwrap()
            .mutate_with(|vf| Ok(vec![("double", vf.col("total")?.multiply(2))]))
            .unwrap()
            .arrange_with(|vf| Ok(vec![("desc", vf.col("double")?)]))
            .unwrap()
    };
    let eager = run(tidy(sales()));
    let lazy = run(tidy(sales()).lazy());
    assert!(lazy.is_lazy());
    assert_eq!(lazy.names(), eager.names());
    assert_eq!(lazy.dtypes(), eager.dtypes());

    let collected = lazy.collect().unwrap();
    assert!(!collected.is_lazy());
    assert!(collected
        .to_df()
        .unwrap()
        .equals_missing(&eager.to_df().unwrap()));
}

#[test]
fn test_lazy_schema_is_known_before_collect() {
    let frame = tidy(sales())
        .lazy()
        .mutate_with(|vf| Ok(vec![("ratio", vf.col("total")?.divide(vf.col("year")?))]))
        .unwrap();
    assert_eq!(frame.schema().dtype("ratio").unwrap(), &Dtype::F64);
}

#[test]
fn test_describe_plan() {
    let frame = tidy(sales());
    let err = frame.describe_plan().unwrap_err();
    assert!(matches!(err, TidyError::InvalidOperation(_)));

    let plan = frame
        .lazy()
        .filter_with(|vf| Ok(vf.col("region")?.equal("a")))
        .unwrap()
        .describe_plan()
        .unwrap();
    assert!(plan.contains("FILTER"));
}

#[test]
fn test_lazy_summarise_and_join() {
    let totals = tidy(sales())
        .lazy()
        .group_by(&["region"])
        .unwrap()
        .summarise_with(|vf| Ok(vec![("sum", vf.col("total")?.sum())]))
        .unwrap();
    assert!(totals.is_lazy());

    let joined = tidy(sales())
        .join(&totals, &["region"], JoinHow::Left)
        .unwrap();
    assert!(joined.is_lazy());
    let expected = df![
        "year" => [2021i64, 2019, 2021, 2020, 2018, 2019, 2022, 2018],
        "region" => ["b", "a", "b", "c", "a", "b", "c", "a"],
        "total" => [10i64, 4, 7, 12, 3, 9, 1, 8],
        "sum" => [26i64, 15, 26, 13, 15, 26, 13, 15],
    ]
    .unwrap();
    assert!(joined.to_df().unwrap().equals_missing(&expected));
}

#[test]
fn test_fetch_runs_first_rows() {
    let out = tidy(sales())
        .lazy()
        .filter_with(|vf| Ok(vf.col("total")?.greater(5)))
        .unwrap()
        .fetch(2)
        .unwrap();
    assert!(!out.is_lazy());
    let total = out.pull("total").unwrap().into_series();
    let total = total.i64().unwrap();
    assert_eq!(total.into_no_null_iter().collect::<Vec<_>>(), [10, 7]);
}
