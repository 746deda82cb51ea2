use std::sync::Arc;

use name_guard_lib::config::{NameGuardConfig, CONFIG_FILENAME};
use name_guard_lib::name_guard::{
    Extraction, NameGuard, RuleSet, VerdictReason, DEFAULT_SEPARATOR, KNOWN_NAME_SCORE,
};

fn guard_with(configure: impl FnOnce(&mut NameGuardConfig)) -> NameGuard {
    let mut config = NameGuardConfig::builtin();
    configure(&mut config);
    NameGuard::from_config(&config).expect("compile rules")
}

/// 占位符映射中的每个占位符都出现在结果中，人名不重复且数量一致
fn assert_contract(input: &str, separator: &str, result: &Extraction) {
    for (placeholder, _) in result.placeholders.iter() {
        assert!(
            result.text.contains(placeholder),
            "{} 未出现在结果中: {}",
            placeholder,
            result.text
        );
    }
    assert_eq!(result.names.len(), result.placeholders.len());

    let mut distinct = result.names.clone();
    distinct.sort();
    distinct.dedup();
    assert_eq!(distinct.len(), result.names.len());

    if !separator.is_empty() {
        assert_eq!(
            result.text.matches(separator).count(),
            input.matches(separator).count()
        );
    }
}

#[test]
fn test_scenarios_with_builtin_rules() {
    let guard = NameGuard::default();
    let cases = [
        ("平安，平安哥", "<<NAME_0>>，<<NAME_0>>哥", vec!["平安"]),
        ("老王，王师傅来了", "老<<NAME_0>>，<<NAME_0>>师傅来了", vec!["王"]),
        ("爸爸，你在哪", "爸爸，你在哪", vec![]),
        ("阿强来找阿强", "阿<<NAME_0>>来找阿<<NAME_0>>", vec!["强"]),
    ];

    for (input, expected, names) in cases {
        let result = guard.protect(input);
        assert_eq!(result.text, expected, "input: {}", input);
        assert_eq!(result.names, names, "input: {}", input);
        assert_contract(input, DEFAULT_SEPARATOR, &result);
    }
}

#[test]
fn test_kinship_roles_never_become_placeholders() {
    let guard = NameGuard::default();
    let inputs = [
        "姐姐，你好",
        "哥哥，别走",
        "叔叔来了",
        "大哥，你好",
        "爸爸，你在哪 <sep> 哥哥，别走",
    ];

    for input in inputs {
        let result = guard.protect(input);
        assert_eq!(result.text, input);
        assert!(!result.changed(), "{} -> {:?}", input, result.names);
    }
}

#[test]
fn test_plain_name_at_call_position_after_separator() {
    let guard = NameGuard::default();
    let input = "平安回来了 <sep> 平安，走吧";
    let result = guard.protect(input);

    assert_eq!(result.text, "<<NAME_0>>回来了 <sep> <<NAME_0>>，走吧");
    assert_eq!(result.names, vec!["平安"]);
    assert_contract(input, DEFAULT_SEPARATOR, &result);

    // 呼唤位禁用后两处都达不到阈值
    let guard = guard_with(|config| config.rules.call_position.enabled = false);
    assert!(!guard.protect(input).changed());
}

#[test]
fn test_known_names_win() {
    let guard = guard_with(|config| {
        config.special.known_names = vec!["张三".to_string(), "李四".to_string()];
    });

    let result = guard.protect("张三说李四不在");
    assert_eq!(result.text, "<<NAME_0>>说<<NAME_1>>不在");
    assert_eq!(result.names, vec!["张三", "李四"]);
    assert_eq!(result.placeholders.placeholder_of("李四"), Some("<<NAME_1>>"));
}

#[test]
fn test_known_name_beats_deny_list_and_gates() {
    let guard = guard_with(|config| {
        config.special.known_names = vec!["爸爸".to_string()];
        config.special.exclude_names.push("爸爸".to_string());
    });

    let verdict = guard.evaluate_word("爸爸", "爸爸", false);
    assert!(verdict.accepted);
    assert_eq!(verdict.score, KNOWN_NAME_SCORE);
    assert_eq!(verdict.reason, VerdictReason::KnownName);

    let result = guard.protect("爸爸，你在哪");
    assert_eq!(result.text, "<<NAME_0>>，你在哪");
}

#[test]
fn test_affix_preserved_next_to_placeholder() {
    let guard = NameGuard::default();
    let input = "平安 <sep> 平安哥，走吧 <sep> 老王，王师傅来了";
    let result = guard.protect(input);

    assert_eq!(
        result.text,
        "<<NAME_0>> <sep> <<NAME_0>>哥，走吧 <sep> 老<<NAME_1>>，<<NAME_1>>师傅来了"
    );
    assert_eq!(result.names, vec!["平安", "王"]);
    assert_contract(input, DEFAULT_SEPARATOR, &result);
}

#[test]
fn test_idempotent_and_deterministic() {
    let guard = NameGuard::default();
    let input = "小明说小红不在 <sep> 阿强来找阿强 <sep> 平安，平安哥";

    let first = guard.protect(input);
    for _ in 0..3 {
        let again = guard.protect(input);
        assert_eq!(again.text, first.text);
        assert_eq!(again.placeholders, first.placeholders);
        assert_eq!(again.names, first.names);
    }

    let clone = guard.clone();
    assert_eq!(clone.protect(input).text, first.text);
}

#[test]
fn test_restore_roundtrip() {
    let guard = NameGuard::default();
    let inputs = [
        "平安，平安哥",
        "老王，王师傅来了 <sep> 阿强来找阿强",
        "小明说小红不在",
        "爸爸，你在哪",
        "",
    ];

    for input in inputs {
        let result = guard.protect(input);
        assert_eq!(result.placeholders.restore(&result.text), input);
    }
}

#[test]
fn test_custom_placeholder_format() {
    let guard = guard_with(|config| {
        config.strategy.name_placeholder_format = "[[P{}]]".to_string();
    });

    let result = guard.protect("平安，平安哥");
    assert_eq!(result.text, "[[P0]]，[[P0]]哥");
}

#[test]
fn test_disabled_honorific_rule_still_needs_threshold() {
    let guard = guard_with(|config| {
        config.rules.honorific.enabled = false;
    });

    // "阿强" 仍拆出 "强" 并通过闸门 2，但失去 100 分称呼加分
    let result = guard.protect("阿强来找阿强");
    assert_eq!(result.text, "阿<<NAME_0>>来找阿强");
    assert_eq!(result.names, vec!["强"]);
}

#[test]
fn test_shared_rule_set_across_threads() {
    let rules: Arc<RuleSet> = RuleSet::builtin();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let guard = NameGuard::new(Arc::clone(&rules));
            std::thread::spawn(move || guard.protect("老王，王师傅来了").text)
        })
        .collect();

    for handle in handles {
        let text = handle.join().expect("worker thread");
        assert_eq!(text, "老<<NAME_0>>，<<NAME_0>>师傅来了");
    }
}

#[test]
fn test_guard_from_saved_config() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join(CONFIG_FILENAME);

    let mut config = NameGuardConfig::builtin();
    config.special.known_names = vec!["李四".to_string()];
    config.save_to_path(&path).expect("save config");

    let loaded = NameGuardConfig::load_from_path(&path).expect("load config");
    let guard = NameGuard::from_config(&loaded).expect("compile rules");
    let result = guard.protect("我找李四有事");
    assert_eq!(result.text, "我找<<NAME_0>>有事");
}

#[test]
fn test_extraction_serializes_as_json() {
    let result = NameGuard::default().protect("平安，平安哥");
    let json = serde_json::to_value(&result).expect("serialize extraction");

    assert_eq!(json["text"], "<<NAME_0>>，<<NAME_0>>哥");
    assert_eq!(json["placeholders"]["<<NAME_0>>"], "平安");
    assert_eq!(json["names"][0], "平安");
}
