//! End-to-end dispatch tests through the public gateway API

use rpcgate_core::ServiceError;
use rpcgate_server::{
    Arity, Declaration, Gateway, MemberInfo, MemberKind, NamespaceRule, RegistryBuilder, Service,
    Visibility, CONTENT_TYPE,
};
use serde_json::{json, Value};

struct Invoice {
    owner: Option<String>,
}

fn gateway() -> Gateway {
    let registry = RegistryBuilder::new()
        .target(
            Service::builder("Echo", |_| Ok(()))
                .method("say", Arity::exact(1), |_: &(), params| params.required::<Value>(0))
                .method("nothing", Arity::exact(0), |_: &(), _| Ok(Value::Null))
                .build(),
        )
        .target(
            Service::builder("billing::Invoice", |token| {
                Ok(Invoice {
                    owner: token.map(str::to_owned),
                })
            })
            .method("owner", Arity::exact(0), |invoice: &Invoice, _| Ok(invoice.owner.clone()))
            .method("total", Arity::with_optional(1, 1), |_: &Invoice, params| {
                let amount: f64 = params.required(0)?;
                let tax: f64 = params.optional(1)?.unwrap_or(0.0);
                Ok(amount * (1.0 + tax))
            })
            .method("void", Arity::exact(1), |_: &Invoice, params| {
                let reason: String = params.required(0)?;
                Err::<Value, _>(ServiceError::new(409, format!("Cannot void: {}", reason)))
            })
            .declare("recalculate", MemberKind::Instance, Visibility::Private, Arity::exact(0))
            .declare("open", MemberKind::Static, Visibility::Public, Arity::exact(1))
            .declare("draft", MemberKind::Instance, Visibility::Public, Arity::exact(0))
            .declare("new", MemberKind::Instance, Visibility::Public, Arity::exact(0))
            .build(),
        )
        .target(Declaration::interface("billing::Payable").with_member("pay", MemberInfo::public(Arity::exact(1))))
        .build();

    Gateway::new(registry, NamespaceRule::default())
}

fn call(gateway: &Gateway, body: Value) -> Value {
    let response = gateway.dispatch(body.to_string().as_bytes());
    assert_eq!(response.status(), 200);
    assert_eq!(response.content_type(), CONTENT_TYPE);
    serde_json::from_slice(response.body()).unwrap()
}

fn error_message(envelope: &Value) -> &str {
    envelope["error"]["message"].as_str().unwrap()
}

#[test]
fn test_echo_roundtrip_bytes() {
    let response = gateway().dispatch(br#"{"method":"Echo.say","params":["hi"],"token":"t"}"#);
    assert_eq!(response.body(), br#"{"error":null,"result":"hi"}"#);
}

#[test]
fn test_unknown_target_bytes() {
    let envelope = call(&gateway(), json!({"method": "Nope.run", "params": [], "token": "t"}));

    assert_eq!(envelope["error"]["code"], json!(0));
    assert!(error_message(&envelope).contains("not found"));
    assert_eq!(envelope["result"], Value::Null);
}

#[test]
fn test_envelope_has_one_side_set() {
    let gateway = gateway();
    let bodies = [
        json!({"method": "Echo.say", "params": [1], "token": "t"}),
        json!({"method": "Echo.say", "params": [], "token": "t"}),
        json!({"method": "billing.Invoice.void", "params": ["late"], "token": "t"}),
        json!({"method": "billing.Payable.pay", "params": [1], "token": "t"}),
        json!({"params": []}),
        json!({"method": "Echo.nothing", "params": [], "token": "t"}),
    ];

    for body in bodies {
        let envelope = call(&gateway, body);
        let object = envelope.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert!(!(!envelope["error"].is_null() && !envelope["result"].is_null()));
    }

    // A null result is a success with both sides null; `error` decides
    let empty = call(&gateway, json!({"method": "Echo.nothing", "params": [], "token": "t"}));
    assert!(empty["error"].is_null());
    assert!(empty["result"].is_null());
}

#[test]
fn test_namespaced_target() {
    let envelope = call(
        &gateway(),
        json!({"method": "billing.Invoice.total", "params": [100, 0.5], "token": "t"}),
    );
    assert_eq!(envelope, json!({"error": null, "result": 150.0}));
}

#[test]
fn test_token_reaches_constructor() {
    let gateway = gateway();

    let with_token = call(&gateway, json!({"method": "billing.Invoice.owner", "params": [], "token": "ada"}));
    assert_eq!(with_token["result"], json!("ada"));

    let numeric_token = call(&gateway, json!({"method": "billing.Invoice.owner", "params": [], "token": 7}));
    assert_eq!(numeric_token["result"], json!("7"));
}

#[test]
fn test_omit_token() {
    let gateway = gateway();

    let missing = call(&gateway, json!({"method": "Echo.say", "params": ["x"]}));
    assert_eq!(error_message(&missing), "No token");

    let omitted = call(&gateway, json!({"method": "Echo.say", "params": ["x"], "omitToken": true}));
    assert_eq!(omitted["result"], json!("x"));
}

#[test]
fn test_decode_errors() {
    let gateway = gateway();

    let cases = [
        (json!({"params": [], "token": "t"}), "Invalid method"),
        (json!({"method": "Echo.say", "params": {"a": 1}, "token": "t"}), "Invalid params"),
        (json!({"method": "Echo.say", "token": "t"}), "Invalid params"),
        (json!(["Echo.say"]), "Invalid request"),
    ];

    for (body, message) in cases {
        let envelope = call(&gateway, body);
        assert_eq!(envelope["error"], json!({"code": 0, "message": message}));
    }

    let response = gateway.dispatch(b"{not json");
    let envelope: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(error_message(&envelope), "Invalid request");
}

#[test]
fn test_empty_target_behaves_like_missing_member() {
    let gateway = gateway();

    let bare = call(&gateway, json!({"method": "say", "params": ["x"], "token": "t"}));
    let missing = call(&gateway, json!({"method": "Echo.shout", "params": ["x"], "token": "t"}));

    assert_eq!(bare["error"]["code"], missing["error"]["code"]);
    assert!(error_message(&bare).ends_with("(not found)"));
    assert!(error_message(&missing).ends_with("(not found)"));
}

#[test]
fn test_forbidden_targets_and_members() {
    let gateway = gateway();

    let interface = call(&gateway, json!({"method": "billing.Payable.pay", "params": [1], "token": "t"}));
    assert_eq!(error_message(&interface), "Invalid rpc.class [billing.Payable.pay]");

    for member in ["recalculate", "open", "new"] {
        let envelope = call(
            &gateway,
            json!({"method": format!("billing.Invoice.{}", member), "params": [], "token": "t"}),
        );
        assert!(error_message(&envelope).ends_with("(not invokable)"), "{}", member);
    }
}

#[test]
fn test_declared_members_without_body_are_refused() {
    let gateway = gateway();

    for member in ["draft", "new"] {
        let envelope = call(
            &gateway,
            json!({"method": format!("billing.Invoice.{}", member), "params": [], "token": "t"}),
        );
        assert_eq!(envelope["error"]["code"], json!(0), "{}", member);
        assert_eq!(
            error_message(&envelope),
            format!("Invalid rpc.method [billing.Invoice.{}] (not invokable)", member)
        );
    }
}

#[test]
fn test_arity_bounds() {
    let gateway = gateway();

    for params in [json!([]), json!([1, 2, 3])] {
        let envelope = call(&gateway, json!({"method": "billing.Invoice.total", "params": params, "token": "t"}));
        let message = error_message(&envelope);
        assert!(message.contains("Wrong number of parameters"));
        assert!(message.contains("(required: 1 optional: 1) expectedMin: 1 expectedMax: 2"));
    }

    let ok = call(&gateway, json!({"method": "billing.Invoice.total", "params": [10], "token": "t"}));
    assert_eq!(ok["result"], json!(10.0));
}

#[test]
fn test_service_failure_forwards_code() {
    let envelope = call(
        &gateway(),
        json!({"method": "billing.Invoice.void", "params": ["paid"], "token": "t"}),
    );
    assert_eq!(
        envelope,
        json!({"error": {"code": 409, "message": "Cannot void: paid"}, "result": null})
    );
}

#[test]
fn test_null_result() {
    let envelope = call(&gateway(), json!({"method": "Echo.nothing", "params": [], "token": "t"}));
    assert_eq!(envelope, json!({"error": null, "result": null}));
}

#[test]
fn test_dispatch_is_idempotent() {
    let gateway = gateway();
    let body = br#"{"method":"billing.Invoice.total","params":[3],"token":"t"}"#;

    let first = gateway.dispatch(body);
    let second = gateway.dispatch(body);
    assert_eq!(first, second);
}

#[test]
fn test_gateway_shared_across_threads() {
    let gateway = gateway();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let gateway = gateway.clone();
            std::thread::spawn(move || {
                let body = json!({"method": "Echo.say", "params": [i], "omitToken": true});
                let response = gateway.dispatch(body.to_string().as_bytes());
                serde_json::from_slice::<Value>(response.body()).unwrap()["result"].clone()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), json!(i));
    }
}
