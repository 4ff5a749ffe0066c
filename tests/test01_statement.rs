use d1_middleware::prelude::*;
use d1_middleware::statement::placeholder_count;

#[test]
fn builds_markers_and_parameters_in_argument_order() -> Result<(), D1MiddlewareError> {
    let stmt = prepare(
        Some("SELECT * FROM t WHERE id = %d AND name = %s"),
        &params![7, "ann"],
    )?
    .expect("template given");

    assert_eq!(stmt.text, "SELECT * FROM t WHERE id = ? AND name = ?");
    assert_eq!(
        stmt.parameters,
        vec![RowValues::Int(7), RowValues::Text("ann".into())]
    );
    Ok(())
}

#[test]
fn mixed_placeholders_with_percent_literals() -> Result<(), D1MiddlewareError> {
    let template = "UPDATE t SET pct = %f, label = '%%d done' WHERE id = %d AND tag LIKE %s";
    assert_eq!(placeholder_count(template), 3);

    let stmt = prepare(Some(template), &params!["12.5", "4", "x%"])?.expect("template given");
    assert_eq!(
        stmt.text,
        "UPDATE t SET pct = ?, label = '%d done' WHERE id = ? AND tag LIKE ?"
    );
    assert_eq!(
        stmt.parameters,
        vec![
            RowValues::Float(12.5),
            RowValues::Int(4),
            RowValues::Text("x%".into())
        ]
    );
    Ok(())
}

#[test]
fn a_prebuilt_argument_list_is_the_same_call() -> Result<(), D1MiddlewareError> {
    let args: Vec<RowValues> = vec![1.into(), "b".into()];
    let from_vec = prepare(Some("a = %d AND b = %s"), &args)?;
    let from_macro = prepare(Some("a = %d AND b = %s"), &params![1, "b"])?;
    assert_eq!(from_vec, from_macro);
    Ok(())
}

#[test]
fn optional_values_bind_null_then_coerce() -> Result<(), D1MiddlewareError> {
    let missing: Option<&str> = None;
    let stmt = prepare(Some("%s, %d"), &params![missing, Some(3)])?.expect("template given");
    assert_eq!(
        stmt.parameters,
        vec![RowValues::Text(String::new()), RowValues::Int(3)]
    );
    Ok(())
}

#[test]
fn no_template_means_no_statement() -> Result<(), D1MiddlewareError> {
    assert!(prepare(None, &params![1, 2])?.is_none());
    Ok(())
}

#[test]
fn underflow_reports_counts() {
    match prepare(Some("%d %d %d"), &params![1]) {
        Err(D1MiddlewareError::ParameterCountMismatch {
            placeholders,
            supplied,
        }) => {
            assert_eq!(placeholders, 3);
            assert_eq!(supplied, 1);
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
}
