//! Currency endpoints: static rate tables and conversions

use std::collections::HashMap;

use api_types::currency::{
    ConvertRequest, ConvertResponse, RatesQuery, RatesResponse, SupportedCurrency,
};
use axum::{Json, extract::Query};

use engine::rates;

pub(crate) fn to_engine(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Inr => engine::Currency::Inr,
        api_types::Currency::Usd => engine::Currency::Usd,
        api_types::Currency::Eur => engine::Currency::Eur,
        api_types::Currency::Gbp => engine::Currency::Gbp,
        api_types::Currency::Aed => engine::Currency::Aed,
        api_types::Currency::Sgd => engine::Currency::Sgd,
        api_types::Currency::Cad => engine::Currency::Cad,
        api_types::Currency::Aud => engine::Currency::Aud,
        api_types::Currency::Jpy => engine::Currency::Jpy,
        api_types::Currency::Cny => engine::Currency::Cny,
    }
}

pub(crate) fn to_api(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Inr => api_types::Currency::Inr,
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Eur => api_types::Currency::Eur,
        engine::Currency::Gbp => api_types::Currency::Gbp,
        engine::Currency::Aed => api_types::Currency::Aed,
        engine::Currency::Sgd => api_types::Currency::Sgd,
        engine::Currency::Cad => api_types::Currency::Cad,
        engine::Currency::Aud => api_types::Currency::Aud,
        engine::Currency::Jpy => api_types::Currency::Jpy,
        engine::Currency::Cny => api_types::Currency::Cny,
    }
}

pub async fn rates(Query(params): Query<RatesQuery>) -> Json<RatesResponse> {
    let base = params.base.unwrap_or_default();
    let rates: HashMap<String, f64> = rates::rates_for(to_engine(base))
        .into_iter()
        .map(|(currency, rate)| (currency.code().to_string(), rate))
        .collect();

    Json(RatesResponse {
        base_currency: base,
        rates,
    })
}

pub async fn supported() -> Json<Vec<SupportedCurrency>> {
    Json(
        engine::Currency::ALL
            .iter()
            .map(|currency| SupportedCurrency {
                code: currency.code().to_string(),
                symbol: currency.symbol().to_string(),
            })
            .collect(),
    )
}

pub async fn convert(Json(payload): Json<ConvertRequest>) -> Json<ConvertResponse> {
    let (converted_minor, exchange_rate) = rates::convert_minor(
        payload.amount_minor,
        to_engine(payload.from_currency),
        to_engine(payload.to_currency),
    );

    Json(ConvertResponse {
        original_minor: payload.amount_minor,
        from_currency: payload.from_currency,
        to_currency: payload.to_currency,
        converted_minor,
        exchange_rate,
    })
}
