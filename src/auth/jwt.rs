use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Decodes and validates an access token. Refresh tokens are rejected.
pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())?;

    if claims.token_type != TokenType::Access {
        return Err("Access token required".to_string());
    }

    Ok(claims)
}

#[cfg(test)]
pub(crate) mod test_tokens {
    use crate::models::{Claims, TokenType};
    use jsonwebtoken::{EncodingKey, Header, encode};

    pub fn token_for(person_id: &str, role: &str, token_type: TokenType, secret: &str) -> String {
        let claims = Claims {
            user_id: person_id.to_string(),
            sub: format!("{}@company.com", person_id),
            role: role.to_string(),
            exp: chrono::Utc::now().timestamp() as usize + 600,
            jti: uuid::Uuid::new_v4().to_string(),
            token_type,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }
}
