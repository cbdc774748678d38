use once_cell::sync::Lazy;

use crate::client::PkdClient;
use crate::models::{PkdCode, PkdPayload};

pub const DEFAULT_LIMIT: usize = 10;

/// Built-in representative PKD codes, shown when the backend cannot serve
/// samples so the browsing surface always has something to render.
static FALLBACK_CODES: Lazy<Vec<PkdCode>> = Lazy::new(|| {
    vec![
        fallback_code(
            "1",
            0.95,
            "62.01.Z",
            "Działalność związana z oprogramowaniem",
            "Obejmuje: tworzenie, rozwój, testowanie i wsparcie oprogramowania",
        ),
        fallback_code(
            "2",
            0.90,
            "47.91.Z",
            "Sprzedaż detaliczna przez Internet",
            "Obejmuje: prowadzenie sklepów internetowych i platform e-commerce",
        ),
        fallback_code(
            "3",
            0.85,
            "56.10.A",
            "Restauracje i inne stałe placówki gastronomiczne",
            "Obejmuje: prowadzenie restauracji, kawiarni, barów i innych placówek gastronomicznych",
        ),
        fallback_code(
            "4",
            0.80,
            "96.02.Z",
            "Fryzjerstwo i pozostałe zabiegi kosmetyczne",
            "Obejmuje: usługi fryzjerskie, kosmetyczne, pielęgnacyjne",
        ),
        fallback_code(
            "5",
            0.75,
            "74.10.Z",
            "Działalność w zakresie specjalistycznego projektowania",
            "Obejmuje: projektowanie mody, wnętrz, grafiki, tworzenie identyfikacji wizualnej",
        ),
    ]
});

fn fallback_code(id: &str, score: f64, code: &str, name: &str, description: &str) -> PkdCode {
    PkdCode::new(
        id,
        1,
        score,
        PkdPayload {
            grupa_klasa_podklasa: code.to_string(),
            nazwa_grupowania: name.to_string(),
            opis_dodatkowy: description.to_string(),
        },
    )
}

pub fn fallback_codes() -> &'static [PkdCode] {
    &FALLBACK_CODES
}

/// Fetch sample codes, falling back to the built-in set when the backend
/// fails or returns nothing.
pub async fn samples_or_fallback(client: &PkdClient, limit: usize) -> Vec<PkdCode> {
    match client.samples(limit).await {
        Ok(codes) if !codes.is_empty() => codes,
        Ok(_) => {
            tracing::info!("backend returned no samples, using built-in set");
            fallback_codes().to_vec()
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not fetch samples, using built-in set");
            fallback_codes().to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_set_is_well_formed() {
        let codes = fallback_codes();
        assert_eq!(codes.len(), 5);
        for code in codes {
            assert!(!code.payload.grupa_klasa_podklasa.is_empty());
            assert!((0.0..=1.0).contains(&code.score));
        }
        // Ordered by descending relevance.
        for pair in codes.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn unreachable_backend_falls_back() {
        let client = PkdClient::new("http://127.0.0.1:9");
        let codes = samples_or_fallback(&client, DEFAULT_LIMIT).await;
        assert_eq!(codes, fallback_codes().to_vec());
    }
}
