use crate::application::repos::RepoError;

/// Postgres SQLSTATE codes the todo queries can raise.
mod sqlstate {
    pub const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";
    pub const INVALID_TEXT_REPRESENTATION: &str = "22P02";
    pub const QUERY_CANCELED: &str = "57014";
}

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some(sqlstate::STRING_DATA_RIGHT_TRUNCATION)
            | Some(sqlstate::INVALID_TEXT_REPRESENTATION) => RepoError::InvalidInput {
                message: db.message().to_string(),
            },
            Some(sqlstate::QUERY_CANCELED) => RepoError::Timeout,
            _ => RepoError::from_persistence(db),
        },
        other => RepoError::from_persistence(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_row_maps_to_not_found() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            RepoError::NotFound
        ));
    }

    #[test]
    fn exhausted_pool_maps_to_timeout() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            RepoError::Timeout
        ));
    }

    #[test]
    fn other_failures_keep_their_message() {
        let mapped = map_sqlx_error(sqlx::Error::Protocol("bad frame".into()));
        match mapped {
            RepoError::Persistence(message) => assert!(message.contains("bad frame")),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
