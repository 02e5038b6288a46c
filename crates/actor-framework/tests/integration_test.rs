use actor_framework::{ActorEntity, BatchStep, FrameworkError, ResourceActor};
use async_trait::async_trait;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Seat {
    id: u32,
    row: char,
    label: String,
    holder: Option<String>,
}

#[derive(Debug)]
struct SeatCreate {
    row: char,
    label: String,
}

#[derive(Debug)]
struct SeatUpdate {
    label: Option<String>,
}

#[derive(Debug, Clone)]
enum SeatAction {
    Book(String),
    Release,
}

#[derive(Debug)]
struct FreeInRow(char);

#[derive(Debug, thiserror::Error, PartialEq)]
enum SeatError {
    #[error("seat {0} is already booked")]
    AlreadyBooked(u32),
    #[error("label must not be empty")]
    EmptyLabel,
}

#[async_trait]
impl ActorEntity for Seat {
    type Id = u32;
    type Create = SeatCreate;
    type Update = SeatUpdate;
    type Action = SeatAction;
    type ActionResult = u32;
    type Filter = FreeInRow;
    type Context = ();
    type Error = SeatError;

    fn from_create_params(id: u32, params: SeatCreate) -> Result<Self, Self::Error> {
        Ok(Self {
            id,
            row: params.row,
            label: params.label,
            holder: None,
        })
    }

    fn matches(&self, filter: &FreeInRow) -> bool {
        self.holder.is_none() && self.row == filter.0
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.label.clone())
    }

    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        if self.label.is_empty() {
            return Err(SeatError::EmptyLabel);
        }
        Ok(())
    }

    async fn on_update(
        &mut self,
        update: SeatUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        if let Some(label) = update.label {
            self.label = label;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: SeatAction,
        _ctx: &Self::Context,
    ) -> Result<u32, Self::Error> {
        match action {
            SeatAction::Book(holder) => {
                if self.holder.is_some() {
                    return Err(SeatError::AlreadyBooked(self.id));
                }
                self.holder = Some(holder);
                Ok(self.id)
            }
            SeatAction::Release => {
                self.holder = None;
                Ok(self.id)
            }
        }
    }
}

async fn seated(seats: &[(char, &str)]) -> actor_framework::ResourceClient<Seat> {
    let (actor, client) = ResourceActor::new(10);
    tokio::spawn(actor.run(()));
    for (row, label) in seats {
        client
            .create(SeatCreate {
                row: *row,
                label: label.to_string(),
            })
            .await
            .unwrap();
    }
    client
}

// --- Tests ---

#[tokio::test]
async fn test_framework_full_lifecycle() {
    let client = seated(&[]).await;

    // 1. Create
    let seat = client
        .create(SeatCreate {
            row: 'A',
            label: "A1".into(),
        })
        .await
        .unwrap();
    assert_eq!(seat.id, 1);

    // 2. Action
    let booked = client
        .perform_action(seat.id, SeatAction::Book("Fara".into()))
        .await
        .unwrap();
    assert_eq!(booked, 1);

    let err = client
        .perform_action(seat.id, SeatAction::Book("Tiana".into()))
        .await
        .unwrap_err();
    assert_eq!(
        err.into_entity_error::<SeatError>().unwrap(),
        SeatError::AlreadyBooked(1)
    );

    // 3. Update
    let updated = client
        .update(
            seat.id,
            SeatUpdate {
                label: Some("A-01".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.label, "A-01");

    // 4. Delete
    client.delete(seat.id).await.unwrap();
    assert!(client.get(seat.id).await.unwrap().is_none());
    assert!(matches!(
        client.delete(seat.id).await,
        Err(FrameworkError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_failed_create_is_not_stored() {
    let client = seated(&[('A', "A1")]).await;

    let err = client
        .create(SeatCreate {
            row: 'A',
            label: String::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(
        err.into_entity_error::<SeatError>().unwrap(),
        SeatError::EmptyLabel
    );
    assert!(client.get(2).await.unwrap().is_none());

    // The counter moved on regardless.
    let next = client
        .create(SeatCreate {
            row: 'A',
            label: "A2".into(),
        })
        .await
        .unwrap();
    assert_eq!(next.id, 3);
}

#[tokio::test]
async fn test_unique_key_conflicts() {
    let client = seated(&[('A', "A1"), ('A', "A2")]).await;

    let dup = client
        .create(SeatCreate {
            row: 'B',
            label: "A1".into(),
        })
        .await;
    assert!(matches!(dup, Err(FrameworkError::Conflict(label)) if label == "A1"));

    let clash = client
        .update(
            2,
            SeatUpdate {
                label: Some("A1".into()),
            },
        )
        .await;
    assert!(matches!(clash, Err(FrameworkError::Conflict(_))));
    assert_eq!(client.get(2).await.unwrap().unwrap().label, "A2");

    // Re-saving an entity under its own label is not a conflict.
    let same = client
        .update(
            2,
            SeatUpdate {
                label: Some("A2".into()),
            },
        )
        .await;
    assert!(same.is_ok());
}

#[tokio::test]
async fn test_list_filters_in_id_order() {
    let client = seated(&[('B', "B1"), ('A', "A1"), ('B', "B2"), ('B', "B3")]).await;
    client
        .perform_action(3, SeatAction::Book("Fara".into()))
        .await
        .unwrap();

    let free_b: Vec<u32> = client
        .list(FreeInRow('B'))
        .await
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(free_b, vec![1, 4]);
}

#[tokio::test]
async fn test_batch_applies_steps_in_order() {
    let client = seated(&[('A', "A1"), ('A', "A2"), ('A', "A3"), ('B', "B1")]).await;

    let results = client
        .batch(vec![
            BatchStep {
                filter: FreeInRow('A'),
                limit: 1,
                action: SeatAction::Book("Fara".into()),
            },
            // Sees the first step's booking, so it picks the next free seats.
            BatchStep {
                filter: FreeInRow('A'),
                limit: 2,
                action: SeatAction::Book("Tiana".into()),
            },
            BatchStep {
                filter: FreeInRow('B'),
                limit: 0,
                action: SeatAction::Book("nobody".into()),
            },
        ])
        .await
        .unwrap();

    assert_eq!(results, vec![vec![(1, 1)], vec![(2, 2), (3, 3)], vec![]]);
    assert!(client.list(FreeInRow('A')).await.unwrap().is_empty());
    assert_eq!(client.list(FreeInRow('B')).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_batch_shortfall_rolls_back_every_step() {
    let client = seated(&[('A', "A1"), ('A', "A2"), ('B', "B1")]).await;

    let err = client
        .batch(vec![
            BatchStep {
                filter: FreeInRow('A'),
                limit: 2,
                action: SeatAction::Book("Fara".into()),
            },
            BatchStep {
                filter: FreeInRow('B'),
                limit: 2,
                action: SeatAction::Book("Fara".into()),
            },
        ])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FrameworkError::Shortfall {
            step: 1,
            requested: 2,
            found: 1
        }
    ));
    assert_eq!(client.list(FreeInRow('A')).await.unwrap().len(), 2);
    assert_eq!(client.list(FreeInRow('B')).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_batches_never_share_entities() {
    let client = seated(&[('A', "A1"), ('A', "A2"), ('A', "A3")]).await;

    let mut handles = vec![];
    for holder in ["Fara", "Tiana"] {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .batch(vec![BatchStep {
                    filter: FreeInRow('A'),
                    limit: 2,
                    action: SeatAction::Book(holder.into()),
                }])
                .await
        }));
    }

    let mut successful = 0;
    let mut short = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(results) => {
                assert_eq!(results[0].len(), 2);
                successful += 1;
            }
            Err(FrameworkError::Shortfall { found, .. }) => {
                assert_eq!(found, 1);
                short += 1;
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!((successful, short), (1, 1));
    assert_eq!(client.list(FreeInRow('A')).await.unwrap().len(), 1);
}
