/*!
 * Tests for bracket and punctuation reconciliation on script lines
 */

use tlgate::translation::reconcile::reconcile;

#[test]
fn test_reconcile_withScriptLines_shouldMatchSourceShape() {
    let cases = [
        ("「先輩、待ってください！」", "前辈，请等一下！", "「前辈，请等一下！」"),
        ("「本当に」", "「真的吗", "「真的吗」"),
        ("本当に？", "真的吗。", "真的吗？"),
        ("彼女は笑った。", "她笑了", "她笑了。"),
        ("ふーん", "哼。", "哼"),
        ("「えっと……", "那个……", "那个……"),
    ];

    for (original, translation, expected) in cases {
        assert_eq!(
            reconcile(original, translation),
            expected,
            "reconcile({:?}, {:?})",
            original,
            translation
        );
    }
}

#[test]
fn test_reconcile_withBracketOnlyTranslation_shouldCompletePair() {
    assert_eq!(reconcile("「……」", "」"), "「」");
}

#[test]
fn test_reconcile_isIdempotentOnScriptLines() {
    let cases = [
        ("「先輩、待ってください！」", "前辈，请等一下"),
        ("「本当に？」", "真的吗！！"),
        ("ふーん", "哼。。"),
        ("そうか、", "是吗"),
    ];
    for (original, translation) in cases {
        let once = reconcile(original, translation);
        assert_eq!(reconcile(original, &once), once);
    }
}
