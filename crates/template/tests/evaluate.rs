use navbar_protocol::{AppState, EntityState, WidgetState};
use serde_json::{Value, json};
use template::{CachePolicy, EvalOptions, TemplateContext, TemplateEngine, TemplateError};

fn app_state() -> AppState {
    let mut app = AppState {
        user: json!({ "name": "Ada", "is_admin": true }),
        current_path: "/lovelace/home".to_string(),
        ..AppState::default()
    };
    app.set_entity(
        EntityState::new("light.kitchen", "on").with_attribute("brightness", json!(180)),
    );
    app.set_entity(EntityState::new("light.hall", "off"));
    app.set_entity(EntityState::new("switch.fan", "on"));
    app.extra.insert(
        "areas".to_string(),
        json!({
            "kitchen": { "area_id": "kitchen", "name": "Kitchen" },
            "office": { "area_id": "office", "name": "Office" }
        }),
    );
    app
}

fn ctx(is_desktop: bool) -> TemplateContext {
    TemplateContext::new(&app_state(), &WidgetState { is_desktop }).unwrap()
}

fn eval(engine: &TemplateEngine, src: &str) -> Result<Value, TemplateError> {
    engine.evaluate(&ctx(false), &json!(src), EvalOptions::strict())
}

#[test]
fn boolean_template_over_states() {
    let engine = TemplateEngine::new();
    let out = eval(&engine, r#"[[[ return states["light.kitchen"].state === "on" ]]]"#).unwrap();
    assert_eq!(out, json!(true));
    let out = eval(&engine, "[[[ return states['light.hall'].state === 'on' ]]]").unwrap();
    assert_eq!(out, json!(false));
}

#[test]
fn all_four_arguments_are_visible() {
    let engine = TemplateEngine::new();
    let c = ctx(true);
    let e = |src: &str| engine.evaluate(&c, &json!(src), EvalOptions::strict()).unwrap();
    assert_eq!(e("[[[ return user.name ]]]"), json!("Ada"));
    assert_eq!(e("[[[ return hass.current_path ]]]"), json!("/lovelace/home"));
    assert_eq!(e("[[[ return navbar.isDesktop ]]]"), json!(true));
    assert_eq!(
        e("[[[ return states['light.kitchen'].attributes.brightness > 100 ]]]"),
        json!(true)
    );
}

#[test]
fn statements_and_loops() {
    let engine = TemplateEngine::new();
    let src = r#"[[[
        var on = 0;
        for s in states.values() {
            if s.state === 'on' { on += 1; }
        }
        return on
    ]]]"#;
    assert_eq!(eval(&engine, src).unwrap(), json!(2));
}

#[test]
fn templates_can_build_popup_items() {
    let engine = TemplateEngine::new();
    let src = r#"[[[
        return hass.areas.values().map(|area| #{
            url: "/config/areas/area/" + area.area_id,
            icon: "mdi:texture-box",
            label: area.name
        })
    ]]]"#;
    assert_eq!(
        eval(&engine, src).unwrap(),
        json!([
            { "url": "/config/areas/area/kitchen", "icon": "mdi:texture-box", "label": "Kitchen" },
            { "url": "/config/areas/area/office", "icon": "mdi:texture-box", "label": "Office" }
        ])
    );
}

#[test]
fn conditional_expressions() {
    let engine = TemplateEngine::new();
    let src = "[[[ return states['light.kitchen'].state === 'on' ? 'mdi:lightbulb' : 'mdi:lightbulb-off' ]]]";
    assert_eq!(eval(&engine, src).unwrap(), json!("mdi:lightbulb"));
    let src = "[[[ return states['light.hall'].state === 'on' ? 'mdi:lightbulb' : 'mdi:lightbulb-off' ]]]";
    assert_eq!(eval(&engine, src).unwrap(), json!("mdi:lightbulb-off"));
    let src = "[[[ return user.is_admin ? (states['switch.fan'].state == 'on' ? 2 : 1) : 0 ]]]";
    assert_eq!(eval(&engine, src).unwrap(), json!(2));
}

#[test]
fn line_breaks_separate_statements() {
    let engine = TemplateEngine::new();
    let src = "[[[\n  const s = states['light.kitchen'].state\n  return s === 'on'\n]]]";
    assert_eq!(eval(&engine, src).unwrap(), json!(true));
    let src = r#"[[[
        var level = states['light.kitchen'].attributes.brightness
        var label = level > 100
            ? 'bright'
            : 'dim'
        return label
    ]]]"#;
    assert_eq!(eval(&engine, src).unwrap(), json!("bright"));
}

#[test]
fn missing_return_is_an_error() {
    let engine = TemplateEngine::new();
    assert!(matches!(eval(&engine, "[[[ 1 + 1 ]]]"), Err(TemplateError::NoReturnValue)));
    assert!(matches!(eval(&engine, "[[[   ]]]"), Err(TemplateError::NoReturnValue)));
    assert!(matches!(
        eval(&engine, "[[[ let x = states.len(); ]]]"),
        Err(TemplateError::NoReturnValue)
    ));
}

#[test]
fn statement_mode_accepts_missing_return() {
    let engine = TemplateEngine::new();
    let c = ctx(false);
    let out = engine
        .evaluate(&c, &json!("[[[ print(user.name) ]]]"), EvalOptions::statement())
        .unwrap();
    assert_eq!(out, json!(null));
    assert!(matches!(
        engine.evaluate(&c, &json!("[[[ throw 1 ]]]"), EvalOptions::statement()),
        Err(TemplateError::Evaluation(_))
    ));
}

#[test]
fn safe_mode_returns_original_template() {
    let engine = TemplateEngine::new();
    let c = ctx(false);
    for src in ["[[[ 1 + 1 ]]]", "[[[ throw \"boom\" ]]]", "[[[ return ( ]]]"] {
        let out = engine.evaluate(&c, &json!(src), EvalOptions::safe()).unwrap();
        assert_eq!(out, json!(src));
    }
}

#[test]
fn non_templates_are_rejected_or_passed_through() {
    let engine = TemplateEngine::new();
    let c = ctx(false);
    for v in [json!("mdi:home"), json!(42), json!(null), json!({ "a": 1 })] {
        assert!(matches!(
            engine.evaluate(&c, &v, EvalOptions::strict()),
            Err(TemplateError::InvalidTemplate(_))
        ));
        assert_eq!(engine.evaluate(&c, &v, EvalOptions::safe()).unwrap(), v);
    }
}

#[test]
fn compile_and_runtime_failures_are_evaluation_errors() {
    let engine = TemplateEngine::new();
    assert!(matches!(eval(&engine, "[[[ return ( ]]]"), Err(TemplateError::Evaluation(_))));
    assert!(matches!(
        eval(&engine, "[[[ throw \"boom\" ]]]"),
        Err(TemplateError::Evaluation(_))
    ));
    // A failed compile leaves nothing behind in the cache.
    assert_eq!(engine.cache_len(), 1);
}

#[test]
fn whitespace_variants_share_a_cache_entry() {
    let engine = TemplateEngine::new();
    let a = eval(&engine, "[[[return states.len()]]]").unwrap();
    let b = eval(&engine, "  [[[   return states.len()\n  ]]]  ").unwrap();
    assert_eq!(a, json!(3));
    assert_eq!(a, b);
    assert_eq!(engine.cache_len(), 1);

    eval(&engine, "[[[ return 1 ]]]").unwrap();
    assert_eq!(engine.cache_len(), 2);
}

#[test]
fn repeated_evaluation_is_deterministic() {
    let engine = TemplateEngine::new();
    let src = "[[[ let n = states.len(); n = n * 2; return n ]]]";
    let first = eval(&engine, src).unwrap();
    for _ in 0..10 {
        assert_eq!(eval(&engine, src).unwrap(), first);
    }
}

#[test]
fn evaluations_do_not_share_argument_mutations() {
    let engine = TemplateEngine::new();
    let c = ctx(false);
    let src = json!("[[[ states.extra = 1; return states.len() ]]]");
    assert_eq!(engine.evaluate(&c, &src, EvalOptions::strict()).unwrap(), json!(4));
    assert_eq!(engine.evaluate(&c, &src, EvalOptions::strict()).unwrap(), json!(4));
}

#[test]
fn lru_policy_does_not_change_results() {
    let engine = TemplateEngine::with_policy(CachePolicy::Lru(1));
    assert_eq!(engine.policy(), CachePolicy::Lru(1));
    for _ in 0..3 {
        assert_eq!(eval(&engine, "[[[ return 1 ]]]").unwrap(), json!(1));
        assert_eq!(eval(&engine, "[[[ return user.name ]]]").unwrap(), json!("Ada"));
    }
    assert_eq!(engine.cache_len(), 1);
}

#[test]
fn typed_evaluation() {
    let engine = TemplateEngine::new();
    let c = ctx(false);
    let names: Vec<String> = engine
        .evaluate_as(&c, &json!("[[[ return states.keys() ]]]"))
        .unwrap();
    assert_eq!(names, vec!["light.hall", "light.kitchen", "switch.fan"]);
    let err = engine
        .evaluate_as::<Vec<String>>(&c, &json!("[[[ return 5 ]]]"))
        .unwrap_err();
    assert!(matches!(err, TemplateError::Conversion(_)));
}

#[test]
fn resolution_helpers_degrade() {
    let engine = TemplateEngine::new();
    let c = ctx(false);
    assert_eq!(engine.resolve_string(&c, &json!("Home")), "Home");
    assert_eq!(engine.resolve_string(&c, &json!("[[[ return `Hi ${user.name}` ]]]")), "Hi Ada");
    assert_eq!(engine.resolve_string(&c, &json!("[[[ return 3 ]]]")), "3");
    assert_eq!(engine.resolve_string(&c, &json!("[[[ oops( ]]]")), "[[[ oops( ]]]");

    assert!(engine.resolve_bool(&c, &json!(true)));
    assert!(!engine.resolve_bool(&c, &json!(null)));
    assert!(engine.resolve_bool(&c, &json!("[[[ return user.is_admin ]]]")));
    assert!(!engine.resolve_bool(&c, &json!("[[[ throw 1 ]]]")));
    assert!(!engine.resolve_bool(&c, &json!("[[[ user.is_admin ]]]")));

    assert_eq!(engine.resolve_number(&c, &json!("12")), Some(12.0));
    assert_eq!(
        engine.resolve_number(&c, &json!("[[[ return states['light.kitchen'].attributes.brightness ]]]")),
        Some(180.0)
    );
    assert_eq!(engine.resolve_number(&c, &json!("[[[ return 'x' ]]]")), None);
}

#[test]
fn legacy_badge_expressions() {
    let engine = TemplateEngine::new();
    let c = ctx(false);
    assert!(engine.evaluate_legacy_badge(&c, "states['light.kitchen'].state === 'on'"));
    assert!(!engine.evaluate_legacy_badge(&c, "states['light.hall'].state === 'on'"));
    assert!(!engine.evaluate_legacy_badge(&c, "user.is_admin"));
    assert!(!engine.evaluate_legacy_badge(&c, "(("));
}

#[test]
fn shared_engine_is_a_singleton() {
    assert!(std::ptr::eq(TemplateEngine::shared(), TemplateEngine::shared()));
}
