use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use tracing::info;

use crate::error::ApiError;
use crate::jobs::otp_poll::start_otp_poll_job;
use crate::middleware::UserId;
use crate::models::order::{
    CommitRequest, CommitResponse, MessageResponse, Order, OrderDetailResponse, OrderListResponse,
    OrderPatch, OrderStatus, QuoteRequest, QuoteResponse,
};
use crate::AppState;

/// POST /order/quote - current marked-up price against the caller's
/// balance. No state change.
pub async fn quote(
    State(state): State<AppState>,
    user: UserId,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let (negara, layanan) = req.require()?;

    let price = state.jasaotp.catalog_price(&negara, &layanan).await? + state.config.margin;
    let saldo = state.wallet.balance(&user.0).await;

    Ok(Json(QuoteResponse {
        ok: true,
        need_topup: saldo < price,
        price,
        saldo,
    }))
}

/// POST /order/commit - the purchase saga: re-price, debit, place the
/// upstream order, persist, start the OTP poller. Every failure after
/// the debit credits the amount back before reporting.
pub async fn commit(
    State(state): State<AppState>,
    user: UserId,
    Json(req): Json<CommitRequest>,
) -> Result<Json<CommitResponse>, ApiError> {
    let (negara, layanan) = QuoteRequest {
        negara: req.negara,
        layanan: req.layanan,
    }
    .require()?;
    let operator = req.operator.unwrap_or_else(|| "any".into());

    // Client-side quotes are distrusted; the price is always re-fetched.
    let price = state.jasaotp.catalog_price(&negara, &layanan).await? + state.config.margin;

    state.wallet.debit(&user.0, price).await?;

    let placed = match state.jasaotp.place_order(&negara, &layanan, &operator).await {
        Ok(placed) => placed,
        Err(e) => {
            // Compensate the debit, whether the provider rejected the
            // order or the call itself failed.
            state.wallet.credit(&user.0, price).await;
            return Err(e);
        }
    };

    let order = Order {
        order_id: placed.order_id,
        user_id: user.0.clone(),
        aplikasi: placed.app.unwrap_or_else(|| layanan.clone()),
        nomor: placed.number,
        negara,
        layanan,
        operator,
        price,
        status: OrderStatus::Pending,
        created_at: Utc::now(),
        otp: None,
        raw: None,
    };
    state.orders.upsert(order.clone()).await;

    start_otp_poll_job(
        state.jasaotp.clone(),
        state.orders.clone(),
        state.pollers.clone(),
        order.order_id.clone(),
        state.config.poll,
    );

    info!(order_id = %order.order_id, user_id = %user.0, price = %price, "order committed");
    Ok(Json(CommitResponse { ok: true, order }))
}

/// GET /orders - caller's orders, newest first.
pub async fn list_orders(
    State(state): State<AppState>,
    user: UserId,
) -> Json<OrderListResponse> {
    let data = state.orders.list(&user.0).await;
    Json(OrderListResponse { ok: true, data })
}

/// GET /order/{id} - owner-scoped lookup.
pub async fn get_order(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
) -> Result<Json<OrderDetailResponse>, ApiError> {
    let order = state
        .orders
        .get(&id)
        .await
        .filter(|o| o.user_id == user.0)
        .ok_or(ApiError::NotFound)?;
    Ok(Json(OrderDetailResponse {
        ok: true,
        data: order,
    }))
}

/// POST /order/{id}/cancel - upstream cancel, stop the poller, mark the
/// order failed, refund the price.
pub async fn cancel_order(
    State(state): State<AppState>,
    user: UserId,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let order = state
        .orders
        .get(&id)
        .await
        .filter(|o| o.user_id == user.0)
        .ok_or(ApiError::NotFound)?;
    if order.status != OrderStatus::Pending {
        return Err(ApiError::Validation(
            "Tidak bisa cancel, sudah bukan pending".into(),
        ));
    }

    state.jasaotp.cancel_order(&id).await?;

    // Stop the in-flight poller before writing the terminal state so a
    // late success probe cannot race the refund.
    state.pollers.cancel(&id);
    state
        .orders
        .patch(
            &id,
            OrderPatch {
                status: Some(OrderStatus::Failed),
                ..Default::default()
            },
        )
        .await?;
    state.wallet.credit(&user.0, order.price).await;

    info!(order_id = %id, user_id = %user.0, price = %order.price, "order cancelled and refunded");
    Ok(Json(MessageResponse {
        ok: true,
        message: "dibatalkan & refund".into(),
    }))
}
