use crate::stage::Stage;

/// Trait that stages implement to opt into the universal test suite.
pub trait StageTestConfig: Stage + Sized {
    /// General test samples (may or may not trigger changes).
    fn samples() -> &'static [&'static str] {
        &["Hello World 123", " déjà-vu ", "TEST", ""]
    }

    /// Samples that must pass through unchanged and without allocation.
    fn should_pass_through() -> &'static [&'static str] {
        &["hello", "world", "test123", "abc def", "tab\there\n", ""]
    }

    /// Input/output pairs that verify correct transformations.
    fn should_transform() -> &'static [(&'static str, &'static str)] {
        &[]
    }
}

/// Assert that a stage satisfies the universal contracts.
///
/// 1. `zero_copy_when_no_changes`: no allocation when input == output
/// 2. `stage_is_idempotent`: applying twice yields the same result as once
/// 3. `needs_apply_is_conservative`: `false` is never wrong
/// 4. `handles_empty_string_and_ascii`
/// 5. `no_panic_on_mixed_scripts`
#[macro_export]
macro_rules! assert_stage_contract {
    ($stage:expr) => {
        $crate::testing::stage_contract::zero_copy_when_no_changes($stage);
        $crate::testing::stage_contract::stage_is_idempotent($stage);
        $crate::testing::stage_contract::needs_apply_is_conservative($stage);
        $crate::testing::stage_contract::handles_empty_string_and_ascii($stage);
        $crate::testing::stage_contract::no_panic_on_mixed_scripts($stage);
    };
}

#[cfg(test)]
use std::borrow::Cow;

#[cfg(test)]
pub fn zero_copy_when_no_changes<S: StageTestConfig>(stage: S) {
    for &input in S::samples() {
        let text = stage.apply(Cow::Borrowed(input)).unwrap();

        // apply() must hand back the caller's buffer whenever nothing changed
        if text == input {
            assert_eq!(
                input as *const str,
                text.as_ref() as *const str,
                "stage `{}` copied unchanged input `{input}`",
                stage.name()
            );
        }

        // second pass over the result must never allocate
        let old_ptr = text.as_ref() as *const str;
        let again = stage.apply(Cow::Borrowed(text.as_ref())).unwrap();
        assert_eq!(
            old_ptr,
            again.as_ref() as *const str,
            "zero-copy violated on second pass (stage `{}`, input: `{input}`)",
            stage.name()
        );
    }

    for &pass_through in S::should_pass_through() {
        let mut text = Cow::Borrowed(pass_through);
        if stage.needs_apply(&text).unwrap() {
            text = stage.apply(text).unwrap();
        }
        assert_eq!(text.as_ref(), pass_through);
        assert_eq!(
            pass_through as *const str,
            text.as_ref() as *const str,
            "zero-copy violated on pass-through sample `{pass_through}`"
        );
    }

    for &(input, expected) in S::should_transform() {
        let text = stage.apply(Cow::Borrowed(input)).unwrap();
        assert_eq!(text.as_ref(), expected);
    }
}

#[cfg(test)]
pub fn stage_is_idempotent<S: StageTestConfig>(stage: S) {
    for &input in S::samples() {
        let once = stage.apply(Cow::Borrowed(input)).unwrap();
        let twice = stage.apply(once.clone()).unwrap();
        assert_eq!(once, twice, "apply() not idempotent on `{input}`");
    }
}

#[cfg(test)]
pub fn needs_apply_is_conservative<S: StageTestConfig>(stage: S) {
    let must_not_touch = ["", "hello", "world123", " !@#"];
    for &sample in S::samples().iter().chain(&must_not_touch) {
        let predicted = stage.needs_apply(sample).expect("needs_apply errored");
        // owned input so stages that always allocate are not penalised
        let output = stage
            .apply(Cow::Owned(sample.to_owned()))
            .expect("apply errored");
        if !predicted {
            assert_eq!(
                output,
                sample,
                "needs_apply() said `false` for stage `{}` but apply changed `{sample}`",
                stage.name()
            );
        }
    }
    for &clean in &must_not_touch {
        assert!(!stage.needs_apply(clean).unwrap(), "ASCII must never need work");
    }
}

#[cfg(test)]
pub fn handles_empty_string_and_ascii<S: StageTestConfig>(stage: S) {
    let empty: &str = "";
    let result_empty = if stage.needs_apply(empty).unwrap() {
        stage.apply(Cow::Borrowed(empty)).unwrap()
    } else {
        Cow::Borrowed(empty)
    };
    assert_eq!(result_empty.as_ref(), "");

    let ascii = "hello world 123 !@#";
    let result_ascii = stage.apply(Cow::Borrowed(ascii)).unwrap();
    assert_eq!(result_ascii.as_ref(), ascii);
}

#[cfg(test)]
pub fn no_panic_on_mixed_scripts<S: StageTestConfig>(stage: S) {
    let _ = stage.apply(Cow::Borrowed(
        "Hello 世界 русский Türkçe العربية 简体中文 한국어 \u{0F73}\u{0334}",
    ));
}
