//! Wire-shape tests — payloads as the investigation backend returns them
//! must decode into the client types, with absent fields defaulting.

use gotham_core::*;
use serde_json::json;

/// Expand responses: `{ nodes: Entity[], edges: Relationship[] }`.
#[test]
fn test_expand_response_shape() {
    let payload = json!({
        "nodes": [
            {
                "id": "P1",
                "type": "Person",
                "properties": {
                    "full_name": "Ayaan Shah",
                    "dob": "1988-11-02",
                    "_source": "civil_registry",
                    "_ingested_at": "2024-02-10T08:15:00Z"
                },
                "risk_flag": "HIGH"
            },
            { "id": "PH1", "type": "Phone", "properties": { "msisdn": "447700900123" } }
        ],
        "edges": [
            { "id": "R1", "source": "P1", "target": "PH1", "type": "OWNS", "properties": {} }
        ]
    });

    let graph: GraphData = serde_json::from_value(payload).unwrap();
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.nodes[0].risk_flag.as_deref(), Some("HIGH"));
    assert!(graph.nodes[0].provenance().ingested_at.is_some());
    assert_eq!(graph.edges[0].rel_type, "OWNS");
}

/// A case-load or search response may carry nodes only.
#[test]
fn test_graph_data_missing_edges() {
    let graph: GraphData = serde_json::from_value(json!({ "nodes": [] })).unwrap();
    assert!(graph.is_empty());
}

#[test]
fn test_search_result_shape() {
    let results: Vec<SearchResult> = serde_json::from_value(json!([
        { "id": "P1", "type": "Person", "display_name": "Ayaan Shah", "properties": { "city": "Leeds" } },
        { "id": "AC7", "type": "Account", "display_name": null }
    ]))
    .unwrap();

    assert_eq!(results[0].entity_type, "Person");
    assert_eq!(results[1].display_name, "");
    assert!(results[1].properties.is_empty());
}

#[test]
fn test_analytics_payload_shapes() {
    let timeline: Vec<TimelineEvent> = serde_json::from_value(json!([
        { "timestamp": "2024-01-04T10:00:00Z", "type": "CALL", "description": "Outgoing call" },
        { "timestamp": "2024-01-05T10:00:00Z", "type": "TRANSFER", "description": "Wire", "details": { "amount": 900 } }
    ]))
    .unwrap();
    assert!(timeline[0].details.is_none());
    assert_eq!(timeline[1].details.as_ref().unwrap()["amount"], 900);

    let sightings: Vec<Sighting> = serde_json::from_value(json!([
        { "latitude": 53.8, "longitude": -1.55, "location_name": "Leeds Station", "timestamp": "2024-01-04" }
    ]))
    .unwrap();
    assert_eq!(sightings[0].location_name, "Leeds Station");

    let contacts: Vec<ContactFrequency> = serde_json::from_value(json!([
        { "phone": "447700900999", "count": 14, "calls": 9 }
    ]))
    .unwrap();
    assert_eq!(contacts[0].calls, Some(9));
    assert_eq!(contacts[0].messages, None);

    let hops: Vec<MoneyHop> = serde_json::from_value(json!([
        { "accountId": "AC1", "amount": 10000.0 },
        { "accountId": "AC2", "amount": 9700 }
    ]))
    .unwrap();
    assert_eq!(hops[1].account_id, "AC2");
    assert_eq!(hops[1].amount, 9700.0);
}

#[test]
fn test_case_and_link_shapes() {
    let cases: Vec<Case> = serde_json::from_value(json!([
        {
            "id": "c-1",
            "name": "OP-GOTHAM-01",
            "description": "Money mule network",
            "status": "open",
            "created_at": "2024-05-01T09:00:00Z",
            "created_by": "analyst-1"
        }
    ]))
    .unwrap();
    assert_eq!(cases[0].status, CaseStatus::Open);

    let links: Vec<CaseEntityRef> = serde_json::from_value(json!([
        { "case_id": "c-1", "entity_id": "P1", "entity_type": "Person", "notes": "" },
        { "case_id": "c-1", "entity_id": "AC1", "entity_type": "Account" }
    ]))
    .unwrap();
    assert_eq!(links[1].notes, None);

    let body = serde_json::to_value(NewCase {
        name: "OP-2".into(),
        description: String::new(),
        user_id: "analyst-1".into(),
    })
    .unwrap();
    assert_eq!(body["user_id"], "analyst-1");
}

/// Case rows written with a naive `isoformat()` timestamp, or none at all,
/// still decode alongside well-formed rows.
#[test]
fn test_case_created_at_is_lenient() {
    let cases: Vec<Case> = serde_json::from_value(json!([
        { "id": "c-1", "name": "OP-1", "created_at": "2024-05-01T09:00:00.123456" },
        { "id": "c-2", "name": "OP-2", "created_at": "2024-05-01T09:00:00Z" },
        { "id": "c-3", "name": "OP-3" },
        { "id": "c-4", "name": "OP-4", "created_at": "yesterday" },
        { "id": "c-5", "name": "OP-5", "created_at": null }
    ]))
    .unwrap();

    assert_eq!(cases.len(), 5);
    let naive = cases[0].created_at.unwrap();
    assert_eq!(naive.to_rfc3339(), "2024-05-01T09:00:00.123456+00:00");
    assert_eq!(
        cases[1].created_at.unwrap().to_rfc3339(),
        "2024-05-01T09:00:00+00:00"
    );
    assert!(cases[2].created_at.is_none());
    assert!(cases[3].created_at.is_none());
    assert!(cases[4].created_at.is_none());
}

/// Properties keep the order the backend sent them in.
#[test]
fn test_properties_keep_backend_order() {
    let entity: Entity = serde_json::from_value(json!({
        "id": "P1",
        "type": "Person",
        "properties": { "full_name": "Ayaan Shah", "dob": "1990-01-01", "alias": "AS" }
    }))
    .unwrap();
    let keys: Vec<&str> = entity.properties.keys().map(String::as_str).collect();
    assert_eq!(keys, ["full_name", "dob", "alias"]);
}

#[test]
fn test_audit_and_mentions_shapes() {
    let logs: Vec<AuditLogEntry> = serde_json::from_value(json!([
        { "user_id": "u1", "action": "VIEW_ENTITY", "entity_type": "Person", "entity_id": "P1", "timestamp": "2024-06-01T10:00:00Z" },
        { "user_id": "u2", "action": "LOGIN", "timestamp": "2024-06-01T10:05:00Z" }
    ]))
    .unwrap();
    assert_eq!(logs[1].entity_id, None);

    let mentions: Vec<DocumentMention> = serde_json::from_value(json!([
        { "document_id": "D1", "classification": "RESTRICTED", "mention": "Ayaan Shah" }
    ]))
    .unwrap();
    assert_eq!(mentions[0].handled_by, None);
}
