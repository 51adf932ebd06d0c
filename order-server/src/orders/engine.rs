//! Workflow engine: the single entry point for every order operation
//!
//! Holds the store and the gateway. Gateway calls always run before the
//! write transaction of the operation that needs them; the transaction
//! re-validates everything it read beforehand.

use std::sync::Arc;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{ActorRef, Address, Cart, CartLine, Wallet};
use shared::order::Order;
use shared::order::dto::{
    AddCartLineRequest, AdminOrderUpdateRequest, CancelOrderRequest, CreateAddressRequest,
    CreateOrderRequest, CreditRefundRequest, RemoveCartLineRequest, ReturnExchangeRequest,
    ReturnRefundRequest, UpdateCartLineRequest, VerifyPaymentRequest,
};
use validator::Validate;

use super::actions;
use crate::db::Store;
use crate::gateway::PaymentGateway;
use crate::gateway::retry::RetryPolicy;
use crate::pricing;

pub struct OrderWorkflow {
    pub(crate) store: Store,
    pub(crate) gateway: Arc<dyn PaymentGateway>,
    pub(crate) retry: RetryPolicy,
    pub(crate) redirect_url: String,
}

impl OrderWorkflow {
    pub fn new(
        store: Store,
        gateway: Arc<dyn PaymentGateway>,
        retry: RetryPolicy,
        redirect_url: String,
    ) -> Self {
        Self {
            store,
            gateway,
            retry,
            redirect_url,
        }
    }

    // ==================== Order operations ====================

    pub async fn create_order(
        &self,
        actor: &ActorRef,
        req: CreateOrderRequest,
    ) -> AppResult<actions::create_order::CreateOrderResponse> {
        actions::create_order::execute(self, actor, req).await
    }

    pub async fn verify_payment(
        &self,
        actor: &ActorRef,
        req: VerifyPaymentRequest,
    ) -> AppResult<actions::verify_payment::PaymentStatusResponse> {
        actions::verify_payment::execute(self, actor, req).await
    }

    /// Finalize a payment from the gateway's server-to-server callback.
    /// The caller has already verified the callback authorization.
    pub async fn gateway_callback(
        &self,
        merchant_order_id: &str,
        state: &str,
    ) -> AppResult<actions::verify_payment::PaymentStatusResponse> {
        actions::verify_payment::execute_callback(self, merchant_order_id, state).await
    }

    pub async fn cancel_order(
        &self,
        actor: &ActorRef,
        req: CancelOrderRequest,
    ) -> AppResult<actions::cancel_order::CancelOrderResponse> {
        actions::cancel_order::execute(self, actor, req).await
    }

    pub async fn return_refund(
        &self,
        actor: &ActorRef,
        req: ReturnRefundRequest,
    ) -> AppResult<actions::return_refund::ReturnRefundResponse> {
        actions::return_refund::execute(self, actor, req).await
    }

    pub async fn return_exchange(
        &self,
        actor: &ActorRef,
        req: ReturnExchangeRequest,
    ) -> AppResult<actions::return_exchange::ReturnExchangeResponse> {
        actions::return_exchange::execute(self, actor, req).await
    }

    pub fn credit_refund(
        &self,
        req: CreditRefundRequest,
    ) -> AppResult<actions::credit_refund::CreditRefundResponse> {
        actions::credit_refund::execute(self, req)
    }

    pub fn admin_update(&self, req: AdminOrderUpdateRequest) -> AppResult<Order> {
        actions::admin_update::execute(self, req)
    }

    // ==================== Order reads ====================

    pub fn get_order_for_actor(&self, actor: &ActorRef, order_id: &str) -> AppResult<Order> {
        actions::load_order_for_actor(&self.store, actor, order_id)
    }

    pub fn list_orders(&self, actor: &ActorRef) -> AppResult<Vec<Order>> {
        Ok(self.store.list_orders_for_actor(actor)?)
    }

    // ==================== Cart operations ====================

    pub fn get_cart(&self, actor: &ActorRef) -> AppResult<Cart> {
        Ok(self
            .store
            .get_cart(actor)?
            .unwrap_or_else(|| Cart::new(actor.clone())))
    }

    pub fn add_cart_line(&self, actor: &ActorRef, req: AddCartLineRequest) -> AppResult<Cart> {
        req.validate().map_err(|e| AppError::validation(e.to_string()))?;

        let item = self
            .store
            .get_item(&req.item_id)?
            .ok_or_else(|| AppError::with_message(ErrorCode::ItemNotFound, "Item not found"))?;
        let variant = item.variant(&req.color, &req.size).ok_or_else(|| {
            AppError::with_message(ErrorCode::VariantNotFound, "No such color/size variant")
        })?;
        let sku = variant.sku.clone();
        let available = variant.stock;

        self.store.with_write(|txn| {
            let mut cart =
                Store::get_cart_txn(txn, actor)?.unwrap_or_else(|| Cart::new(actor.clone()));

            let new_quantity = cart
                .line(&req.item_id, &req.color, &req.size)
                .map(|l| l.quantity)
                .unwrap_or(0)
                + req.quantity;
            if new_quantity > available {
                return Err(AppError::with_message(
                    ErrorCode::CartQuantityExceeded,
                    format!("Only {} in stock for {}", available, sku),
                ));
            }

            match cart.line_mut(&req.item_id, &req.color, &req.size) {
                Some(line) => line.quantity = new_quantity,
                None => cart.lines.push(CartLine {
                    item_id: req.item_id.clone(),
                    color: req.color.clone(),
                    size: req.size.clone(),
                    sku: sku.clone(),
                    quantity: req.quantity,
                    total_quantity: None,
                    total_price: None,
                }),
            }
            self.refresh_partner_totals(actor, &mut cart, &req.item_id, &item);
            cart.updated_at = chrono::Utc::now();
            Store::put_cart_txn(txn, &cart)?;
            Ok(cart)
        })
    }

    pub fn update_cart_line(
        &self,
        actor: &ActorRef,
        req: UpdateCartLineRequest,
    ) -> AppResult<Cart> {
        req.validate().map_err(|e| AppError::validation(e.to_string()))?;

        let item = self
            .store
            .get_item(&req.item_id)?
            .ok_or_else(|| AppError::with_message(ErrorCode::ItemNotFound, "Item not found"))?;
        let available = item
            .variant(&req.color, &req.size)
            .map(|v| v.stock)
            .unwrap_or(0);

        self.store.with_write(|txn| {
            let mut cart = Store::get_cart_txn(txn, actor)?.ok_or_else(|| {
                AppError::with_message(ErrorCode::CartNotFound, "Cart is empty")
            })?;
            let line = cart
                .line_mut(&req.item_id, &req.color, &req.size)
                .ok_or_else(|| {
                    AppError::with_message(ErrorCode::CartLineMissing, "Line not in cart")
                })?;
            if req.quantity > available {
                return Err(AppError::with_message(
                    ErrorCode::CartQuantityExceeded,
                    format!("Only {} in stock", available),
                ));
            }
            line.quantity = req.quantity;
            self.refresh_partner_totals(actor, &mut cart, &req.item_id, &item);
            cart.updated_at = chrono::Utc::now();
            Store::put_cart_txn(txn, &cart)?;
            Ok(cart)
        })
    }

    pub fn remove_cart_line(
        &self,
        actor: &ActorRef,
        req: RemoveCartLineRequest,
    ) -> AppResult<Cart> {
        req.validate().map_err(|e| AppError::validation(e.to_string()))?;

        self.store.with_write(|txn| {
            let mut cart = Store::get_cart_txn(txn, actor)?.ok_or_else(|| {
                AppError::with_message(ErrorCode::CartNotFound, "Cart is empty")
            })?;
            let before = cart.lines.len();
            cart.lines
                .retain(|l| !(l.item_id == req.item_id && l.color == req.color && l.size == req.size));
            if cart.lines.len() == before {
                return Err(AppError::with_message(
                    ErrorCode::CartLineMissing,
                    "Line not in cart",
                ));
            }
            cart.updated_at = chrono::Utc::now();
            Store::put_cart_txn(txn, &cart)?;
            Ok(cart)
        })
    }

    /// Partner cart lines carry server-computed PPQ totals
    fn refresh_partner_totals(
        &self,
        actor: &ActorRef,
        cart: &mut Cart,
        item_id: &str,
        item: &shared::models::Item,
    ) {
        if actor.kind != shared::models::ActorKind::Partner {
            return;
        }
        for line in cart.lines.iter_mut().filter(|l| l.item_id == item_id) {
            let unit = pricing::tier_unit_price(item, line.quantity);
            line.total_quantity = Some(line.quantity);
            line.total_price = Some(unit * rust_decimal::Decimal::from(line.quantity));
        }
    }

    // ==================== Addresses ====================

    pub fn create_address(
        &self,
        actor: &ActorRef,
        req: CreateAddressRequest,
    ) -> AppResult<Address> {
        req.validate().map_err(|e| AppError::validation(e.to_string()))?;

        let address = Address {
            id: uuid::Uuid::new_v4().to_string(),
            actor: actor.clone(),
            name: req.name,
            line1: req.line1,
            line2: req.line2,
            city: req.city,
            state: req.state,
            pincode: req.pincode,
            phone: req.phone,
        };

        self.store.with_write(|txn| {
            Store::put_address_txn(txn, &address)?;
            Ok(())
        })?;
        Ok(address)
    }

    pub fn list_addresses(&self, actor: &ActorRef) -> AppResult<Vec<Address>> {
        Ok(self.store.list_addresses_for_actor(actor)?)
    }

    // ==================== Wallet ====================

    pub fn get_wallet(&self, partner_id: &str) -> AppResult<Wallet> {
        Ok(self
            .store
            .get_wallet(partner_id)?
            .unwrap_or_else(|| Wallet::new(partner_id)))
    }
}
