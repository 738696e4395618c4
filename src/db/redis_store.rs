use async_trait::async_trait;
use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use redis::{AsyncCommands, Script};

use crate::{
    db::store::{Document, DocumentStore, Filter, Sort, UpsertOutcome, ensure_id},
    errors::AppError,
};

pub type RedisClient = Pool<RedisConnectionManager>;

// Shared by the write scripts: first document in hash KEYS[1] matching a JSON filter.
const FIND_LUA: &str = r#"
local function matches(doc, filter)
    for field, expected in pairs(filter) do
        if doc[field] ~= expected then
            return false
        end
    end
    return true
end

local function find(key, filter)
    local entries = redis.call('HGETALL', key)
    for i = 1, #entries, 2 do
        local doc = cjson.decode(entries[i + 1])
        if matches(doc, filter) then
            return entries[i], doc
        end
    end
    return nil, nil
end
"#;

const UPSERT_LUA: &str = r#"
local filter = cjson.decode(ARGV[1])
local set = cjson.decode(ARGV[2])
local on_insert = cjson.decode(ARGV[3])

local id, doc = find(KEYS[1], filter)
if id then
    for field, value in pairs(set) do
        doc[field] = value
    end
    redis.call('HSET', KEYS[1], id, cjson.encode(doc))
    return {0, id}
end

doc = {}
for field, value in pairs(filter) do doc[field] = value end
for field, value in pairs(on_insert) do doc[field] = value end
for field, value in pairs(set) do doc[field] = value end
redis.call('HSET', KEYS[1], doc['id'], cjson.encode(doc))
return {1, doc['id']}
"#;

const UPDATE_LUA: &str = r#"
local filter = cjson.decode(ARGV[1])
local patch = cjson.decode(ARGV[2])

local id, doc = find(KEYS[1], filter)
if not id then
    return 0
end
for field, value in pairs(patch) do
    doc[field] = value
end
redis.call('HSET', KEYS[1], id, cjson.encode(doc))
return 1
"#;

const DELETE_LUA: &str = r#"
local filter = cjson.decode(ARGV[1])

local id = find(KEYS[1], filter)
if not id then
    return 0
end
return redis.call('HDEL', KEYS[1], id)
"#;

/// Each collection is one Redis hash `<prefix>:<collection>`, field = document id,
/// value = the document as JSON. Writes that must see existing documents run as
/// Lua scripts so the server executes them atomically.
pub struct RedisStore {
    redis: RedisClient,
    key_prefix: String,
    upsert_script: Script,
    update_script: Script,
    delete_script: Script,
}

impl RedisStore {
    pub async fn connect(url: &str, key_prefix: &str) -> Result<Self, AppError> {
        let manager = RedisConnectionManager::new(url)?;
        let redis = Pool::builder().build(manager).await?;

        let store = Self::from_pool(redis, key_prefix);
        store.ping().await?;

        tracing::info!("Redis store connected with key prefix '{}'", key_prefix);
        Ok(store)
    }

    pub fn from_pool(redis: RedisClient, key_prefix: &str) -> Self {
        Self {
            redis,
            key_prefix: key_prefix.to_string(),
            upsert_script: Script::new(&format!("{FIND_LUA}{UPSERT_LUA}")),
            update_script: Script::new(&format!("{FIND_LUA}{UPDATE_LUA}")),
            delete_script: Script::new(&format!("{FIND_LUA}{DELETE_LUA}")),
        }
    }

    fn key(&self, collection: &str) -> String {
        format!("{}:{}", self.key_prefix, collection)
    }

    async fn load(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, AppError> {
        let mut conn = self.redis.get().await?;

        let values: Vec<String> = conn
            .hvals(self.key(collection))
            .await
            .map_err(AppError::RedisCommandError)?;

        let mut documents = Vec::new();
        for raw in values {
            let document: Document = serde_json::from_str(&raw).map_err(|e| {
                AppError::Deserialization(format!("Malformed document in {collection}: {e}"))
            })?;
            if filter.matches(&document) {
                documents.push(document);
            }
        }

        Ok(documents)
    }
}

fn to_json(document: &Document) -> Result<String, AppError> {
    serde_json::to_string(document).map_err(|e| AppError::Serialization(e.to_string()))
}

#[async_trait]
impl DocumentStore for RedisStore {
    async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.redis.get().await.map_err(|e| {
            AppError::Unavailable(format!("Redis connection unavailable: {e}"))
        })?;

        let _: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| AppError::Unavailable(format!("Redis did not answer PING: {e}")))?;

        Ok(())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, AppError> {
        Ok(self.load(collection, filter).await?.into_iter().next())
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> Result<Vec<Document>, AppError> {
        let mut documents = self.load(collection, filter).await?;
        if let Some(sort) = sort {
            sort.apply(&mut documents);
        }
        Ok(documents)
    }

    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<String, AppError> {
        let id = ensure_id(&mut document);
        let json = to_json(&document)?;

        let mut conn = self.redis.get().await?;
        let _: () = conn
            .hset(self.key(collection), &id, json)
            .await
            .map_err(AppError::RedisCommandError)?;

        tracing::debug!("Inserted {} into {}", id, collection);
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Document,
    ) -> Result<bool, AppError> {
        let mut conn = self.redis.get().await?;

        let updated: i64 = self
            .update_script
            .key(self.key(collection))
            .arg(to_json(&filter.to_document())?)
            .arg(to_json(&patch)?)
            .invoke_async(&mut *conn)
            .await
            .map_err(AppError::RedisCommandError)?;

        Ok(updated > 0)
    }

    async fn upsert_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
        mut set_on_insert: Document,
    ) -> Result<UpsertOutcome, AppError> {
        // The script cannot mint UUIDs, so the insert id is chosen up front.
        ensure_id(&mut set_on_insert);

        let mut conn = self.redis.get().await?;

        let (inserted, id): (i64, String) = self
            .upsert_script
            .key(self.key(collection))
            .arg(to_json(&filter.to_document())?)
            .arg(to_json(&set)?)
            .arg(to_json(&set_on_insert)?)
            .invoke_async(&mut *conn)
            .await
            .map_err(AppError::RedisCommandError)?;

        tracing::debug!("Upserted {} in {} (inserted: {})", id, collection, inserted == 1);

        if inserted == 1 {
            Ok(UpsertOutcome::Inserted(id))
        } else {
            Ok(UpsertOutcome::Updated(id))
        }
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, AppError> {
        let mut conn = self.redis.get().await?;

        let deleted: i64 = self
            .delete_script
            .key(self.key(collection))
            .arg(to_json(&filter.to_document())?)
            .invoke_async(&mut *conn)
            .await
            .map_err(AppError::RedisCommandError)?;

        Ok(deleted > 0)
    }
}
