mod groups;
mod lazy;
mod unify;
mod verbs;

use polars::prelude::*;
use polars_tidy::prelude::TidyFrame;

/// Sales per year, with the years out of order and repeated.
pub fn sales() -> DataFrame {
    df![
        "year" => [2021i64, 2019, 2021, 2020, 2018, 2019, 2022, 2018],
        "region" => ["b", "a", "b", "c", "a", "b", "c", "a"],
        "total" => [10i64, 4, 7, 12, 3, 9, 1, 8],
    ]
    .unwrap()
}

pub fn tidy(df: DataFrame) -> TidyFrame {
    TidyFrame::new(df).unwrap()
}
