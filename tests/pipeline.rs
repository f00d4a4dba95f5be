use approx::assert_relative_eq;
use ndarray::{array, Array2, Array3};

use edge_inference::preprocessing::{
    negative_sum_of_changes, positive_sum_of_changes, Aggregation, DownsamplingTransformer,
    FillMissingValues, FillStrategy, SumColumns, WindowTransformer,
};
use edge_inference::{Pipeline, PipelineSpec, PreprocessError, Samples, Transformer};

#[test]
fn window_ten_by_three() {
    let x = Array2::from_shape_fn((10, 3), |(r, c)| (c * 100 + r) as f64);
    let out = WindowTransformer::new(3, 2)
        .unwrap()
        .transform(&x.into())
        .unwrap()
        .into_single("test")
        .unwrap();
    assert_eq!(out.dim(), (4, 9));
    assert_eq!(out.row(2).to_vec(), vec![4.0, 5.0, 6.0, 104.0, 105.0, 106.0, 204.0, 205.0, 206.0]);
}

#[test]
fn sum_of_changes_on_known_series() {
    let x = array![1.0, 3.0, 2.0, 5.0, 4.0];
    assert_relative_eq!(positive_sum_of_changes(x.view()), 5.0);
    assert_relative_eq!(negative_sum_of_changes(x.view()), -2.0);
}

#[test]
fn fit_is_identity_on_configuration() {
    let t = DownsamplingTransformer::new(3, Aggregation::Max).unwrap();
    let data: Samples = Array2::<f64>::zeros((5, 2)).into();
    let fitted = t.clone().fit(&data);
    assert_eq!(
        fitted.transform(&data).unwrap(),
        t.transform(&data).unwrap()
    );
}

#[test]
fn fill_then_sum_then_window() {
    let nan = f64::NAN;
    let rows = vec![
        vec![1.0, 1.0, 1.0],
        vec![nan, 1.0, 1.0],
        vec![2.0, 2.0, nan],
        vec![2.0, 2.0, 2.0],
    ];
    let input = Samples::from_rows(&rows).unwrap();
    assert_eq!(input.count_missing(), 2);

    let pipeline = Pipeline::new()
        .with_step(FillMissingValues::new(FillStrategy::Forward).unwrap())
        .with_step(SumColumns::new())
        .with_step(WindowTransformer::new(2, 1).unwrap());
    let (pipeline, out) = pipeline.fit_transform(&input).unwrap();
    assert_eq!(pipeline.len(), 3);
    let out = out.into_single("test").unwrap();
    assert_eq!(out, array![[3.0, 3.0], [3.0, 5.0], [5.0, 6.0]]);
}

#[test]
fn batch_chain_from_json() {
    let spec: PipelineSpec = serde_json::from_str(
        r#"{"steps": [
            {"type": "fill_missing", "value": 0},
            {"type": "sum_columns"},
            {"type": "reshape", "columns": 1},
            {"type": "downsample", "nbr_items": 3, "agg_func": "positive_sum_of_changes"},
            {"type": "window", "window_size": 2, "step_size": 2}
        ]}"#,
    )
    .unwrap();
    let pipeline = spec.build().unwrap();

    // sums 0, 3, 3, 9, 6, 15
    let mut input = Array3::<f64>::zeros((1, 6, 3));
    for (r, v) in [0.0, 1.0, 1.0, 3.0, 2.0, 5.0].iter().enumerate() {
        input.slice_mut(ndarray::s![0, r, ..]).fill(*v);
    }
    input[[0, 0, 1]] = f64::NAN;

    let out = pipeline.transform(&input.into()).unwrap().into_single("test").unwrap();
    // rolling positive change over 3: [3, 6, 6, 9] -> windows of 2 stepping 2
    assert_eq!(out, array![[3.0, 6.0], [6.0, 9.0]]);
}

#[test]
fn shape_errors_name_the_step() {
    let err = DownsamplingTransformer::new(10, Aggregation::Mean)
        .unwrap()
        .transform(&Array2::<f64>::zeros((4, 1)).into())
        .unwrap_err();
    assert!(matches!(err, PreprocessError::ShapeMismatch { step: "downsample", .. }));
}
