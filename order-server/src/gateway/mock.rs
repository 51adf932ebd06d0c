//! Scriptable in-memory gateway for tests
//!
//! Queues of scripted results are consumed call by call; an empty queue
//! yields a sensible success. Calls are recorded for assertions.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::order::GatewayState;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{CheckoutSession, GatewayError, GatewayResult, PaymentGateway};

#[derive(Default)]
pub struct MockGateway {
    initiate_queue: Mutex<VecDeque<GatewayResult<CheckoutSession>>>,
    verify_queue: Mutex<VecDeque<GatewayResult<GatewayState>>>,
    refund_queue: Mutex<VecDeque<GatewayResult<String>>>,
    pub initiate_calls: Mutex<Vec<(String, Decimal)>>,
    pub verify_calls: Mutex<Vec<String>>,
    pub refund_calls: Mutex<Vec<(String, Decimal)>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_initiate(&self, result: GatewayResult<CheckoutSession>) {
        self.initiate_queue.lock().unwrap().push_back(result);
    }

    pub fn push_initiate_failure(&self, times: u32) {
        for _ in 0..times {
            self.push_initiate(Err(GatewayError::Api("scripted failure".into())));
        }
    }

    pub fn push_verify(&self, state: GatewayState) {
        self.verify_queue.lock().unwrap().push_back(Ok(state));
    }

    pub fn push_refund(&self, result: GatewayResult<String>) {
        self.refund_queue.lock().unwrap().push_back(result);
    }

    pub fn refund_total(&self) -> Decimal {
        self.refund_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, amount)| *amount)
            .sum()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn initiate(
        &self,
        merchant_order_id: &str,
        amount: Decimal,
        _redirect_url: &str,
    ) -> GatewayResult<CheckoutSession> {
        self.initiate_calls
            .lock()
            .unwrap()
            .push((merchant_order_id.to_string(), amount));

        match self.initiate_queue.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(CheckoutSession {
                gateway_order_id: format!("GW-{merchant_order_id}"),
                checkout_url: Some(format!("https://pay.test/checkout/{merchant_order_id}")),
            }),
        }
    }

    async fn verify(&self, merchant_order_id: &str) -> GatewayResult<GatewayState> {
        self.verify_calls
            .lock()
            .unwrap()
            .push(merchant_order_id.to_string());

        match self.verify_queue.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(GatewayState::Completed),
        }
    }

    async fn refund(
        &self,
        merchant_order_id: &str,
        refund_id: &str,
        amount: Decimal,
    ) -> GatewayResult<String> {
        self.refund_calls
            .lock()
            .unwrap()
            .push((merchant_order_id.to_string(), amount));

        match self.refund_queue.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(format!("RF-{refund_id}")),
        }
    }
}
