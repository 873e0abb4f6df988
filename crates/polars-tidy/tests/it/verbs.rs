use polars_tidy::prelude::{
    coalesce, format, lit, Dtype, FillStrategy, JoinHow, Literal, RankMethod, TidyError,
    WindowOptions,
};

use super::*;

fn people() -> DataFrame {
    df![
        "name" => [Some(" Ada "), Some("bob"), None, Some("Cy")],
        "age" => [Some(36i64), None, Some(51), Some(36)],
        "score" => [1.5, 2.5, f64::NAN, 4.0],
    ]
    .unwrap()
}

#[test]
fn test_filter_requires_boolean() {
    let frame = tidy(sales());
    let err = frame
        .filter_with(|vf| Ok(vf.col("total")?.pow(3)))
        .unwrap_err();
    assert!(matches!(err, TidyError::InvalidReturnType(_)));
    assert!(err.to_string().contains("integer"));

    let err = frame
        .filter_with(|vf| Ok(vf.col("total")?.cast(Dtype::F64).pow(3)))
        .unwrap_err();
    assert!(err.to_string().contains("f64"));

    let err = frame.filter_with(|_| Ok(Literal::Integer(1))).unwrap_err();
    assert!(matches!(err, TidyError::InvalidReturnType(_)));
}

#[test]
fn test_filter_and_predicates() {
    let out = tidy(people())
        .filter_with(|vf| Ok(vf.col("age")?.is_not_nil() & vf.col("score")?.is_finite()))
        .unwrap();
    assert_eq!(out.n_rows().unwrap(), 2);

    let out = tidy(people())
        .filter_with(|vf| Ok(vf.col("name")?.contains("b")))
        .unwrap();
    assert_eq!(out.n_rows().unwrap(), 1);
}

#[test]
fn test_arrange_directions() {
    let frame = tidy(sales());
    let err = frame
        .arrange_with(|vf| Ok(vec![("descending", vf.col("total")?)]))
        .unwrap_err();
    assert!(matches!(err, TidyError::InvalidDirection(_)));
    assert!(err.to_string().contains("descending"));

    let out = frame
        .arrange_with(|vf| Ok(vec![("asc", vf.col("region")?), ("desc", vf.col("year")?)]))
        .unwrap()
        .to_df()
        .unwrap();
    let expected = df![
        "year" => [2019i64, 2018, 2018, 2021, 2021, 2019, 2022, 2020],
        "region" => ["a", "a", "a", "b", "b", "b", "c", "c"],
        "total" => [4i64, 3, 8, 10, 7, 9, 1, 12],
    ]
    .unwrap();
    assert!(out.equals_missing(&expected));

    let out = frame
        .arrange_with(|vf| Ok(vf.col("year")?))
        .unwrap()
        .pull("total")
        .unwrap()
        .into_series();
    let expected = Series::new("total".into(), [3i64, 8, 4, 9, 12, 10, 7, 1]);
    assert!(out.equals_missing(&expected));
}

#[test]
fn test_mutate_requires_pairs() {
    let err = tidy(sales())
        .mutate_with(|vf| Ok(vf.col("total")?))
        .unwrap_err();
    assert!(matches!(err, TidyError::InvalidReturnType(_)));
}

#[test]
fn test_summarise_requires_aggregations() {
    let err = tidy(sales())
        .summarise_with(|vf| Ok(vec![("t", vf.col("total")?.add(1))]))
        .unwrap_err();
    assert!(matches!(err, TidyError::InvalidReturnType(_)));

    let out = tidy(sales())
        .summarise_with(|vf| {
            let total = vf.col("total")?;
            Ok(vec![
                ("n", total.count()),
                ("distinct_years", vf.col("year")?.n_distinct()),
                ("mean", total.mean()),
                ("spread", total.max().subtract(total.min())),
            ])
        })
        .unwrap()
        .to_df()
        .unwrap();
    let expected = df![
        "n" => [8i64],
        "distinct_years" => [5i64],
        "mean" => [6.75],
        "spread" => [11i64],
    ]
    .unwrap();
    assert!(out.equals_missing(&expected));
}

#[test]
fn test_string_operations() {
    let out = tidy(people())
        .mutate_with(|vf| {
            let name = vf.col("name")?;
            Ok(vec![
                ("upper", name.strip().upcase()),
                ("len", name.lengths()),
                ("label", format([name.strip().into(), ":".into(), vf.col("age")?.into()])),
                ("short", name.strip().substring(0, Some(2))),
                ("swapped", name.replace("b", "B")),
            ])
        })
        .unwrap()
        .to_df()
        .unwrap();
    let expected = df![
        "upper" => [Some("ADA"), Some("BOB"), None, Some("CY")],
        "len" => [Some(5i64), Some(3), None, Some(2)],
        "label" => [Some("Ada:36"), None, None, Some("Cy:36")],
        "short" => [Some("Ad"), Some("bo"), None, Some("Cy")],
        "swapped" => [Some(" Ada "), Some("BoB"), None, Some("Cy")],
    ]
    .unwrap();
    let out = out
        .select(["upper", "len", "label", "short", "swapped"])
        .unwrap();
    assert!(out.equals_missing(&expected));
}

#[test]
fn test_windows_and_cumulative() {
    let out = tidy(df!["v" => [1i64, 2, 3, 4]].unwrap())
        .mutate_with(|vf| {
            let v = vf.col("v")?;
            Ok(vec![
                ("rolling", v.window_sum(WindowOptions::new(2))),
                ("running", v.cumulative_sum(false)),
                ("rank", v.rank(RankMethod::Ordinal, true)),
                ("lagged", v.shift(1)),
            ])
        })
        .unwrap()
        .to_df()
        .unwrap();

    // The first window is partial.
    let rolling = out.column("rolling").unwrap().as_materialized_series();
    let rolling = rolling.i64().unwrap();
    assert_eq!(
        (1..4).map(|i| rolling.get(i)).collect::<Vec<_>>(),
        [Some(3), Some(5), Some(7)]
    );

    let expected = df![
        "running" => [1i64, 3, 6, 10],
        "rank" => [4i64, 3, 2, 1],
        "lagged" => [None, Some(1i64), Some(2), Some(3)],
    ]
    .unwrap();
    let out = out.select(["running", "rank", "lagged"]).unwrap();
    assert!(out.equals_missing(&expected));
}

#[test]
fn test_fill_missing_and_coalesce() {
    let out = tidy(people())
        .mutate_with(|vf| {
            let age = vf.col("age")?;
            Ok(vec![
                ("forward", age.fill_missing(FillStrategy::Forward)),
                ("zero", age.fill_missing_with(0)),
                ("either", coalesce([age.clone(), lit(-1)])),
            ])
        })
        .unwrap()
        .to_df()
        .unwrap();
    let expected = df![
        "forward" => [36i64, 36, 51, 36],
        "zero" => [36i64, 0, 51, 36],
        "either" => [36i64, -1, 51, 36],
    ]
    .unwrap();
    let out = out.select(["forward", "zero", "either"]).unwrap();
    assert!(out.equals_missing(&expected));
}

#[test]
fn test_column_verbs() {
    let frame = tidy(sales());
    assert_eq!(frame.names(), ["year", "region", "total"]);
    assert_eq!(
        frame.dtypes(),
        [Dtype::Integer, Dtype::String, Dtype::Integer]
    );
    assert_eq!(frame.n_rows().unwrap(), 8);

    let out = frame.select(&["total", "year"]).unwrap();
    assert_eq!(out.names(), ["total", "year"]);

    let out = frame.group_by(&["region"]).unwrap().select(&["total"]).unwrap();
    assert_eq!(out.names(), ["region", "total"]);

    let out = frame.drop(&["region"]).unwrap();
    assert_eq!(out.names(), ["year", "total"]);

    let out = frame
        .group_by(&["region"])
        .unwrap()
        .rename(&[("region", "area")])
        .unwrap();
    assert_eq!(out.names(), ["year", "area", "total"]);
    assert_eq!(out.groups(), ["area"]);

    let err = frame.select(&["missing"]).unwrap_err();
    assert!(matches!(err, TidyError::ColumnNotFound(_)));
}

#[test]
fn test_row_verbs() {
    let frame = tidy(sales());
    let region = |f: TidyFrame| {
        f.pull("region")
            .unwrap()
            .into_series()
            .str()
            .unwrap()
            .into_no_null_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    };

    assert_eq!(region(frame.head(2).unwrap()), ["b", "a"]);
    assert_eq!(region(frame.tail(2).unwrap()), ["c", "a"]);
    assert_eq!(region(frame.slice(2, 2).unwrap()), ["b", "c"]);
    assert_eq!(region(frame.distinct(&["region"]).unwrap()), ["b", "a", "c"]);
    assert_eq!(frame.distinct(&[]).unwrap().n_rows().unwrap(), 8);

    let out = tidy(people()).drop_nils(&["age"]).unwrap();
    assert_eq!(out.n_rows().unwrap(), 3);
    let out = tidy(people()).drop_nils(&[]).unwrap();
    assert_eq!(out.n_rows().unwrap(), 2);
}

#[test]
fn test_join() {
    let regions = tidy(
        df![
            "region" => ["a", "b", "d"],
            "label" => ["north", "south", "west"],
        ]
        .unwrap(),
    );
    let frame = tidy(sales());

    let inner = frame.join(&regions, &["region"], JoinHow::Inner).unwrap();
    assert_eq!(inner.n_rows().unwrap(), 6);
    assert_eq!(inner.names(), ["year", "region", "total", "label"]);

    let left = frame.join(&regions, &["region"], JoinHow::Left).unwrap();
    assert_eq!(left.n_rows().unwrap(), 8);
    let label = left.pull("label").unwrap();
    assert_eq!(label.as_series().null_count(), 2);

    let outer = frame.join(&regions, &["region"], JoinHow::Outer).unwrap();
    assert_eq!(outer.n_rows().unwrap(), 9);
    assert_eq!(outer.names(), ["year", "region", "total", "label"]);

    let err = frame.join(&regions, &["year"], JoinHow::Inner).unwrap_err();
    assert!(matches!(err, TidyError::ColumnNotFound(_)));
}

#[test]
fn test_numeric_ops() {
    let frame = tidy(df!["x" => [-1.24, 2.56, 7.71]].unwrap());
    let out = frame
        .mutate_with(|vf| {
            let x = vf.col("x")?;
            Ok(vec![
                ("abs", x.abs()),
                ("round", x.round(1)),
                ("floor", x.floor()),
                ("ceil", x.ceil()),
                ("clip", x.clip(0.0, 5.0)),
            ])
        })
        .unwrap()
        .to_df()
        .unwrap();
    let expected = df![
        "x" => [-1.24, 2.56, 7.71],
        "abs" => [1.24, 2.56, 7.71],
        "round" => [-1.2, 2.6, 7.7],
        "floor" => [-2.0, 2.0, 7.0],
        "ceil" => [-1.0, 3.0, 8.0],
        "clip" => [0.0, 2.56, 5.0],
    ]
    .unwrap();
    assert!(out.equals_missing(&expected));

    let out = frame
        .summarise_with(|vf| {
            let x = vf.col("x")?;
            Ok(vec![
                ("top", x.argmax()),
                ("bottom", x.argmin()),
                ("big", x.greater(7.0).any()),
                ("positive", x.greater(0.0).all()),
            ])
        })
        .unwrap()
        .to_df()
        .unwrap();
    let expected = df![
        "top" => [2i64],
        "bottom" => [0i64],
        "big" => [true],
        "positive" => [false],
    ]
    .unwrap();
    assert!(out.equals_missing(&expected));
}

#[test]
fn test_window_median() {
    let out = tidy(df!["v" => [1i64, 2, 3, 4]].unwrap())
        .mutate_with(|vf| {
            let v = vf.col("v")?;
            Ok(vec![("median", v.window_median(WindowOptions::new(2)))])
        })
        .unwrap();
    assert_eq!(out.dtypes()[1], Dtype::F64);
    let median = out.pull("median").unwrap().into_series();
    let median = median.f64().unwrap();
    assert_eq!(
        (1..4).map(|i| median.get(i)).collect::<Vec<_>>(),
        [Some(1.5), Some(2.5), Some(3.5)]
    );
}

#[test]
fn test_regex_string_ops() {
    let out = tidy(df!["s" => ["a1", "b22", "c"]].unwrap())
        .mutate_with(|vf| {
            let s = vf.col("s")?;
            Ok(vec![
                ("digits", s.re_contains(r"\d+")),
                ("masked", s.re_replace(r"\d", "#")),
            ])
        })
        .unwrap()
        .to_df()
        .unwrap();
    let expected = df![
        "s" => ["a1", "b22", "c"],
        "digits" => [true, true, false],
        "masked" => ["a#", "b##", "c"],
    ]
    .unwrap();
    assert!(out.equals_missing(&expected));
}

#[test]
fn test_unsigned_columns_are_integers() {
    let frame = tidy(df!["a" => [1u64, 2, 3]].unwrap());
    assert_eq!(frame.dtypes(), [Dtype::Integer]);
    let out = frame.filter_with(|vf| Ok(vf.col("a")?.greater(1))).unwrap();
    assert_eq!(out.n_rows().unwrap(), 2);
}

#[test]
fn test_frame_debug() {
    let frame = tidy(sales()).group_by(&["region"]).unwrap();
    let debug = format!("{frame:?}");
    assert!(debug.starts_with("TidyFrame"));
    assert!(debug.contains("region"));
}

#[test]
fn test_pivot_longer() {
    let frame = tidy(
        df![
            "id" => ["x", "y"],
            "a" => [1i64, 2],
            "b" => [3i64, 4],
        ]
        .unwrap(),
    );
    let out = frame
        .pivot_longer(&["id"], &["a", "b"], "key", "value")
        .unwrap()
        .to_df()
        .unwrap();
    let expected = df![
        "id" => ["x", "y", "x", "y"],
        "key" => ["a", "a", "b", "b"],
        "value" => [1i64, 2, 3, 4],
    ]
    .unwrap();
    assert!(out.equals_missing(&expected));

    let err = frame
        .pivot_longer(&["id"], &["missing"], "key", "value")
        .unwrap_err();
    assert!(matches!(err, TidyError::ColumnNotFound(_)));
}

#[test]
fn test_concat_rows() {
    let frame = tidy(sales());
    let out = frame
        .head(2)
        .unwrap()
        .concat_rows(&[frame.tail(1).unwrap()])
        .unwrap();
    assert_eq!(out.n_rows().unwrap(), 3);
    let total = out.pull("total").unwrap().into_series();
    let total = total.i64().unwrap();
    assert_eq!(total.into_no_null_iter().collect::<Vec<_>>(), [10, 4, 8]);

    let err = frame.concat_rows(&[tidy(people())]).unwrap_err();
    assert!(matches!(err, TidyError::Engine(_)));
}

#[test]
fn test_join_on_and_cross() {
    let areas = tidy(
        df![
            "area" => ["a", "b"],
            "label" => ["north", "south"],
        ]
        .unwrap(),
    );
    let frame = tidy(sales());

    let out = frame
        .join_on(&areas, &["region"], &["area"], JoinHow::Inner)
        .unwrap();
    assert_eq!(out.n_rows().unwrap(), 6);
    assert_eq!(out.names(), ["year", "region", "total", "label"]);

    let out = frame.join_on(&areas, &[], &[], JoinHow::Cross).unwrap();
    assert_eq!(out.n_rows().unwrap(), 16);
    assert_eq!(out.names(), ["year", "region", "total", "area", "label"]);

    let err = frame
        .join_on(&areas, &["region"], &["area"], JoinHow::Cross)
        .unwrap_err();
    assert!(matches!(err, TidyError::InvalidOperation(_)));
    let err = frame
        .join_on(&areas, &["region", "year"], &["area"], JoinHow::Left)
        .unwrap_err();
    assert!(matches!(err, TidyError::InvalidOperation(_)));
}
