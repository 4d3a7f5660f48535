use serde::Deserialize;
use serde_json::{Value, json};

use crate::dao::search_index::IndexCollection;

/// Body of a ranked `multi_match` query over the collection's search fields.
pub fn multi_match_query(collection: IndexCollection, query: &str, size: usize) -> Value {
    json!({
        "size": size,
        "query": {
            "multi_match": {
                "query": query,
                "fields": collection.search_fields(),
            }
        }
    })
}

/// Mapping used when a collection is created.
pub fn collection_mapping(collection: IndexCollection) -> Value {
    match collection {
        IndexCollection::Courts => json!({
            "mappings": {
                "properties": {
                    "court_id": { "type": "long" },
                    "uuid": { "type": "keyword" },
                    "name": { "type": "text", "analyzer": "english" },
                    "address": { "type": "text", "analyzer": "english" },
                    "court_type": { "type": "keyword" },
                    "surface_type": { "type": "keyword" },
                    "amenities": { "type": "text", "analyzer": "english" },
                    "rating": { "type": "float" },
                    "number_of_courts": { "type": "integer" }
                }
            }
        }),
        IndexCollection::Games => json!({
            "mappings": {
                "properties": {
                    "game_id": { "type": "long" },
                    "court_id": { "type": "long" },
                    "court_name": { "type": "text", "analyzer": "english" },
                    "date": { "type": "date" },
                    "time": { "type": "keyword" },
                    "skill_level": { "type": "keyword" },
                    "status": { "type": "keyword" },
                    "notes": { "type": "text", "analyzer": "english" },
                    "max_players": { "type": "integer" },
                    "current_players": { "type": "integer" }
                }
            }
        }),
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: Value,
}

impl Hit {
    /// Primary-store identifier of the hit, read from the document body or the document id.
    pub fn store_id(&self, collection: IndexCollection) -> Option<i64> {
        self.source
            .get(collection.id_field())
            .and_then(Value::as_i64)
            .or_else(|| self.id.parse().ok())
    }
}

impl SearchResponse {
    /// Identifiers in rank order, skipping hits that carry no usable id.
    pub fn ranked_ids(&self, collection: IndexCollection) -> Vec<i64> {
        self.hits
            .hits
            .iter()
            .filter_map(|hit| hit.store_id(collection))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_ids_follow_hit_order() {
        let payload = json!({
            "hits": {
                "hits": [
                    { "_id": "7", "_source": { "court_id": 7 } },
                    { "_id": "3", "_source": {} },
                    { "_id": "not-a-number", "_source": { "name": "x" } },
                    { "_id": "x", "_source": { "court_id": 12 } }
                ]
            }
        });
        let response: SearchResponse = serde_json::from_value(payload).unwrap();

        assert_eq!(response.ranked_ids(IndexCollection::Courts), vec![7, 3, 12]);
    }

    #[test]
    fn query_uses_boosted_fields() {
        let body = multi_match_query(IndexCollection::Games, "open play", 50);
        assert_eq!(body["query"]["multi_match"]["fields"][0], "court_name^2");
        assert_eq!(body["query"]["multi_match"]["query"], "open play");
    }
}
