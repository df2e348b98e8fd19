mod severity;
