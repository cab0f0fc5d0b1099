//! Tracer link persistence: lookups, activation toggle and get-or-create
//!
//! Both invariants are enforced by unique indexes, not by in-process locks:
//! `(job_id, source_path, destination_url_hash)` and `token`.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, sea_query::OnConflict,
};
use tracing::{debug, error, info};

use super::SeaOrmStorage;
use super::converters::{model_to_tracer_link, new_link_active_model};
use super::retry::{self, ErrorClass};
use crate::errors::{Result, TracerError};
use crate::services::token::{TokenDraw, slugify};
use crate::storage::{IssueOptions, NewTracerLink, TracerLink};

use migration::entities::tracer_link;

/// 单次插入尝试的结果
enum InsertOutcome {
    Inserted,
    /// 三元组已存在（另一个写入者抢先）
    TripleExists,
    /// token 已被占用
    TokenTaken,
}

impl SeaOrmStorage {
    pub async fn find_link_by_triple(
        &self,
        job_id: &str,
        source_path: &str,
        destination_url_hash: &str,
    ) -> Result<Option<TracerLink>> {
        let db = &self.db;
        let model = retry::with_retry("find_link_by_triple", self.retry_config, || async {
            tracer_link::Entity::find()
                .filter(tracer_link::Column::JobId.eq(job_id))
                .filter(tracer_link::Column::SourcePath.eq(source_path))
                .filter(tracer_link::Column::DestinationUrlHash.eq(destination_url_hash))
                .one(db)
                .await
        })
        .await?;

        Ok(model.map(model_to_tracer_link))
    }

    /// 按 token 查找（不区分启用状态）
    pub async fn find_link_by_token(&self, token: &str) -> Result<Option<TracerLink>> {
        let db = &self.db;
        let model = retry::with_retry("find_link_by_token", self.retry_config, || async {
            tracer_link::Entity::find()
                .filter(tracer_link::Column::Token.eq(token))
                .one(db)
                .await
        })
        .await?;

        Ok(model.map(model_to_tracer_link))
    }

    /// 按 token 查找启用中的链接，重定向只走这个入口
    pub async fn find_active_link_by_token(&self, token: &str) -> Result<Option<TracerLink>> {
        let db = &self.db;
        let model = retry::with_retry("find_active_link_by_token", self.retry_config, || async {
            tracer_link::Entity::find()
                .filter(tracer_link::Column::Token.eq(token))
                .filter(tracer_link::Column::IsActive.eq(true))
                .one(db)
                .await
        })
        .await?;

        Ok(model.map(model_to_tracer_link))
    }

    pub async fn find_link_by_id(&self, id: &str) -> Result<Option<TracerLink>> {
        let db = &self.db;
        let model = retry::with_retry("find_link_by_id", self.retry_config, || async {
            tracer_link::Entity::find_by_id(id.to_string()).one(db).await
        })
        .await?;

        Ok(model.map(model_to_tracer_link))
    }

    /// 某职位下的全部链接（含停用），按更新时间倒序
    pub async fn list_job_links(&self, job_id: &str) -> Result<Vec<TracerLink>> {
        let db = &self.db;
        let models = retry::with_retry("list_job_links", self.retry_config, || async {
            tracer_link::Entity::find()
                .filter(tracer_link::Column::JobId.eq(job_id))
                .order_by_desc(tracer_link::Column::UpdatedAt)
                .all(db)
                .await
        })
        .await?;

        Ok(models.into_iter().map(model_to_tracer_link).collect())
    }

    /// 启用 / 停用链接。链接创建后唯一允许的修改。
    pub async fn set_link_active(&self, id: &str, is_active: bool) -> Result<TracerLink> {
        use sea_orm::ActiveValue::Set;

        let db = &self.db;
        let model = retry::with_retry("set_link_active.find", self.retry_config, || async {
            tracer_link::Entity::find_by_id(id.to_string()).one(db).await
        })
        .await?
        .ok_or_else(|| TracerError::not_found(format!("Tracer link not found: {}", id)))?;

        if model.is_active == is_active {
            return Ok(model_to_tracer_link(model));
        }

        let mut active: tracer_link::ActiveModel = model.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(chrono::Utc::now());
        let updated = retry::with_retry("set_link_active.update", self.retry_config, || {
            let active = active.clone();
            async move { active.update(db).await }
        })
        .await?;

        info!(
            "Tracer link {} ({}) is now {}",
            updated.id,
            updated.token,
            if is_active { "active" } else { "inactive" }
        );
        Ok(model_to_tracer_link(updated))
    }

    /// Return the link for `(job, source path, destination hash)`, minting a
    /// token on first use.
    ///
    /// Concurrent callers for the same triple converge on one row. A token
    /// collision draws again. Running out of attempts is a hard error naming
    /// the slug.
    pub async fn get_or_create_link(
        &self,
        request: &NewTracerLink,
        options: &IssueOptions,
    ) -> Result<TracerLink> {
        if let Some(existing) = self.find_existing(request).await? {
            return Ok(existing);
        }

        let seed = request.slug_prefix_seed.as_deref().unwrap_or_default();
        let mut draw = TokenDraw::new(slugify(seed, &options.default_slug), options.max_attempts);

        while let Some(token) = draw.next_token() {
            match self.try_insert_link(request, &token).await? {
                InsertOutcome::Inserted => {
                    if let Some(created) = self.find_link_by_token(&token).await?
                        && created.job_id == request.job_id
                        && created.source_path == request.source_path
                        && created.destination_url_hash == request.destination_url_hash
                    {
                        info!(
                            "Tracer link issued: {} -> {} (job {}, {})",
                            created.token, created.destination_url, created.job_id, created.source_path
                        );
                        return Ok(created);
                    }
                    // 插入成功但 token 指向别的行：以三元组为准
                    if let Some(existing) = self.find_existing(request).await? {
                        return Ok(existing);
                    }
                }
                InsertOutcome::TripleExists | InsertOutcome::TokenTaken => {
                    if let Some(existing) = self.find_existing(request).await? {
                        debug!(
                            "Concurrent writer issued {} for job {} at {}",
                            existing.token, existing.job_id, existing.source_path
                        );
                        return Ok(existing);
                    }
                    debug!("Token {} already taken, drawing again", token);
                }
            }
        }

        error!(
            "Token space exhausted for slug '{}' after {} attempts (job {}, {})",
            draw.slug(),
            draw.attempts(),
            request.job_id,
            request.source_path
        );
        Err(TracerError::token_space_exhausted(format!(
            "no free token for slug prefix '{}' after {} attempts",
            draw.slug(),
            draw.attempts()
        )))
    }

    async fn find_existing(&self, request: &NewTracerLink) -> Result<Option<TracerLink>> {
        self.find_link_by_triple(
            &request.job_id,
            &request.source_path,
            &request.destination_url_hash,
        )
        .await
    }

    /// INSERT ... ON CONFLICT (job_id, source_path, destination_url_hash) DO NOTHING
    async fn try_insert_link(&self, request: &NewTracerLink, token: &str) -> Result<InsertOutcome> {
        let db = &self.db;
        let result = retry::with_retry("insert_tracer_link", self.retry_config, || async {
            tracer_link::Entity::insert(new_link_active_model(request, token))
                .on_conflict(
                    OnConflict::columns([
                        tracer_link::Column::JobId,
                        tracer_link::Column::SourcePath,
                        tracer_link::Column::DestinationUrlHash,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(db)
                .await
        })
        .await;

        match result {
            Ok(0) => Ok(InsertOutcome::TripleExists),
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) if retry::classify(&e) == ErrorClass::UniqueViolation => {
                Ok(InsertOutcome::TokenTaken)
            }
            Err(e) => Err(TracerError::database_operation(format!(
                "插入 tracer link 失败: {}",
                e
            ))),
        }
    }
}
