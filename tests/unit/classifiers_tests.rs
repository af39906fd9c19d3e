/*!
 * Tests for the text classifiers on realistic script lines
 */

use tlgate::translation::classifiers::{
    contains_source_script, has_excessive_repetition, has_excessive_repetition_with,
    is_expressive_repetition, is_mostly_untranslatable,
};

#[test]
fn test_isMostlyUntranslatable_withStatusLabels_shouldReturnTrue() {
    for label in ["新規", "堕落度: 1", "HP 100/100", "東京都新宿区", "★★★"] {
        assert!(is_mostly_untranslatable(label), "expected untranslatable: {}", label);
    }
}

#[test]
fn test_isMostlyUntranslatable_withDialogue_shouldReturnFalse() {
    for line in ["「ありがとう」", "今日はいい天気ですね", "先輩、待ってください！"] {
        assert!(!is_mostly_untranslatable(line), "expected translatable: {}", line);
    }
}

#[test]
fn test_containsSourceScript_withMixedOutput_shouldDetectLeftoverKana() {
    assert!(contains_source_script("我们去吃ラーメン吧"));
    assert!(!contains_source_script("我们去吃拉面吧"));
    assert!(!contains_source_script("「早上好！」"));
}

#[test]
fn test_isExpressiveRepetition_withBreathingLine_shouldReturnTrue() {
    assert!(is_expressive_repetition("ふぅー……っ♥　ふぅー……っ♥"));
    assert!(is_expressive_repetition("あっ……あっ……"));
    assert!(is_expressive_repetition("だめ だめ"));
}

#[test]
fn test_isExpressiveRepetition_withNarration_shouldReturnFalse() {
    assert!(!is_expressive_repetition("彼女は静かに部屋を出ていった。"));
    assert!(!is_expressive_repetition(""));
}

#[test]
fn test_hasExcessiveRepetition_withRunOfKana_shouldReturnTrue() {
    assert!(has_excessive_repetition("ああああああああ", 8));
    assert!(has_excessive_repetition("ははははははははは", 8));
}

#[test]
fn test_hasExcessiveRepetition_withEightIdeographs_shouldReturnFalse() {
    assert!(!has_excessive_repetition("好好好好好好好好", 8));
}

#[test]
fn test_hasExcessiveRepetition_withLaughterInterjection_shouldReturnFalse() {
    assert!(!has_excessive_repetition("哈哈哈哈哈哈哈哈哈哈哈哈", 8));
    assert!(!has_excessive_repetition("！！！！！！！！！！", 8));
}

#[test]
fn test_hasExcessiveRepetition_withRepeatedPhrase_shouldReturnTrue() {
    assert!(has_excessive_repetition("我爱你我爱你我爱你", 3));
    assert!(!has_excessive_repetition("我爱你，你爱我吗", 3));
}

#[test]
fn test_hasExcessiveRepetitionWith_withZeroTolerance_shouldTreatIdeographsLikeKana() {
    assert!(has_excessive_repetition_with("好好好好好好好好", 8, 0));
    assert!(!has_excessive_repetition_with("好好好好好好好好", 8, 1));
}
